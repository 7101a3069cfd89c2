//! Decision oracle port
//!
//! The single suspension point that asks the non-deterministic reasoning
//! source for a routing decision. The adapter returns the raw reply text,
//! trimmed by the caller; interpretation is the speaker selector's job.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur asking the decision oracle.
///
/// All of these are recoverable: upstream they degrade to an unresolved
/// decision and deterministic fallback selection, never a crash.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// The external reasoning call used for turn routing.
///
/// Stateless per call: the full rendered prompt goes in, free text comes
/// out. Implementations must not interpret the reply.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Ask for a routing decision given the rendered prompt.
    async fn ask(&self, prompt: &str) -> Result<String, OracleError>;
}
