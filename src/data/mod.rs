pub mod corpus;
pub mod json;
pub mod types;
