//! Participant invocation port
//!
//! A participant's content generation is an opaque async call: history in,
//! produced message bodies out. Authorship and sequence indices are
//! assigned by the orchestration loop at append time, keeping the
//! single-writer invariant on the history.

use async_trait::async_trait;
use roundtable_domain::{Message, Participant};
use thiserror::Error;

/// Errors that can occur invoking a participant.
///
/// Unlike oracle errors these are not recovered locally: a failed
/// invocation aborts the current turn and ends the run. Retries, if
/// desired, belong inside the adapter's own external call.
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// A registered worker capable of producing messages given the history.
#[async_trait]
pub trait ParticipantAgent: Send + Sync {
    /// Identity and capability description of this participant.
    fn profile(&self) -> &Participant;

    /// Produce zero or more message bodies for this participant's turn.
    async fn invoke(&self, history: &[Message]) -> Result<Vec<String>, InvokeError>;
}
