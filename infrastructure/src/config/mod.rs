//! Configuration file handling.

pub mod file_config;
pub mod loader;
