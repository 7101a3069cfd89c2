//! Subprocess participant agent.

use super::{CommandError, CommandResolveError, DEFAULT_COMMAND_TIMEOUT, resolve_command, run_command};
use async_trait::async_trait;
use roundtable_application::{InvokeError, ParticipantAgent};
use roundtable_domain::{Message, Participant};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// [`ParticipantAgent`] backed by an external command.
///
/// The history snapshot goes to the command's stdin as JSONL (one message
/// object per line); trimmed stdout becomes the participant's message body.
/// An empty reply means the participant produced nothing this turn.
pub struct CommandParticipant {
    profile: Participant,
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandParticipant {
    /// Resolve `command` on PATH and build the adapter.
    pub fn new(
        profile: Participant,
        command: &str,
        args: Vec<String>,
    ) -> Result<Self, CommandResolveError> {
        Ok(Self {
            profile,
            program: resolve_command(command)?,
            args,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn render_stdin(history: &[Message]) -> String {
        let mut input = String::new();
        for message in history {
            if let Ok(line) = serde_json::to_string(message) {
                input.push_str(&line);
                input.push('\n');
            }
        }
        input
    }
}

#[async_trait]
impl ParticipantAgent for CommandParticipant {
    fn profile(&self) -> &Participant {
        &self.profile
    }

    async fn invoke(&self, history: &[Message]) -> Result<Vec<String>, InvokeError> {
        debug!(participant = %self.profile.name, "Invoking participant command");
        let input = Self::render_stdin(history);
        let reply = run_command(&self.program, &self.args, &input, self.timeout)
            .await
            .map_err(|e| match e {
                CommandError::Timeout(_) => InvokeError::Timeout,
                CommandError::Spawn(err) => InvokeError::ConnectionError(err.to_string()),
                other => InvokeError::RequestFailed(other.to_string()),
            })?;

        if reply.is_empty() {
            Ok(vec![])
        } else {
            Ok(vec![reply])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Participant {
        Participant::new("Echo", "echoes the last line of history")
    }

    #[tokio::test]
    async fn test_invoke_feeds_history_and_reads_reply() {
        // `tail -n1` replies with the last history line
        let agent =
            CommandParticipant::new(profile(), "tail", vec!["-n1".to_string()]).unwrap();
        let history = vec![
            Message::initiator("start", 0),
            Message::participant("Analyst", "the plan", 1),
        ];

        let replies = agent.invoke(&history).await.unwrap();
        assert_eq!(replies.len(), 1);
        // The reply is the JSONL rendering of the last message
        let parsed: serde_json::Value = serde_json::from_str(&replies[0]).unwrap();
        assert_eq!(parsed["text"], "the plan");
    }

    #[tokio::test]
    async fn test_empty_reply_means_no_messages() {
        let agent = CommandParticipant::new(profile(), "true", vec![]).unwrap();
        let replies = agent.invoke(&[]).await.unwrap();
        assert!(replies.is_empty());
    }

    #[tokio::test]
    async fn test_failure_surfaces_as_invoke_error() {
        let agent = CommandParticipant::new(profile(), "false", vec![]).unwrap();
        let err = agent.invoke(&[]).await.unwrap_err();
        assert!(matches!(err, InvokeError::RequestFailed(_)));
    }
}
