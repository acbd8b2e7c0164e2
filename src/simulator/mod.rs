pub mod frame;
pub mod goal;
pub mod scorer;
pub mod session;
pub mod simulator;
pub mod synthesizer;
