pub mod template_parser;
