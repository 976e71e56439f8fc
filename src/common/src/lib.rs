pub mod bucket_file;
pub mod cli;
pub mod config;

pub use config::Configuration;
