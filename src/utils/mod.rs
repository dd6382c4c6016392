pub mod config;
pub mod filename;
