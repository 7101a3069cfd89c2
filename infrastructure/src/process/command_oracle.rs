//! Subprocess decision oracle.

use super::{CommandError, CommandResolveError, DEFAULT_COMMAND_TIMEOUT, resolve_command, run_command};
use async_trait::async_trait;
use roundtable_application::{DecisionOracle, OracleError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// [`DecisionOracle`] backed by an external command.
///
/// The rendered prompt is written to the command's stdin; its stdout is the
/// raw decision text. The command is stateless per call; a fresh process
/// per decision.
pub struct CommandOracle {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandOracle {
    /// Resolve `command` on PATH and build the adapter.
    pub fn new(command: &str, args: Vec<String>) -> Result<Self, CommandResolveError> {
        Ok(Self {
            program: resolve_command(command)?,
            args,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DecisionOracle for CommandOracle {
    async fn ask(&self, prompt: &str) -> Result<String, OracleError> {
        debug!(program = %self.program.display(), "Asking decision oracle");
        run_command(&self.program, &self.args, prompt, self.timeout)
            .await
            .map_err(|e| match e {
                CommandError::Timeout(_) => OracleError::Timeout,
                CommandError::Spawn(err) => OracleError::ConnectionError(err.to_string()),
                other => OracleError::RequestFailed(other.to_string()),
            })
    }
}
