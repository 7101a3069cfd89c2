//! Infrastructure layer for roundtable
//!
//! Adapters for the application layer's ports: configuration file loading,
//! JSONL transcript logging, and subprocess-backed oracle/participant
//! implementations.

pub mod config;
pub mod logging;
pub mod process;

// Re-export commonly used types
pub use config::{
    file_config::{ConfigError, FileConfig, ParticipantSection},
    loader::ConfigLoader,
};
pub use logging::jsonl_logger::JsonlTranscriptLogger;
pub use process::{
    command_oracle::CommandOracle, command_participant::CommandParticipant, CommandResolveError,
};
