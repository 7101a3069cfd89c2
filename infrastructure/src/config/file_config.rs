//! Serde model of the `roundtable.toml` configuration file.
//!
//! ```toml
//! [orchestrator]
//! first_participant = "Analyst"
//! terminal_authority = "Reviewer"
//! max_iterations = 100
//!
//! [markers]
//! rejection = ["cannot approve", "issues found"]
//! approval = ["approved", "pull request created"]
//!
//! [oracle]
//! command = "routing-oracle"
//! args = ["--model", "fast"]
//! timeout_secs = 60
//!
//! [[participants]]
//! name = "Analyst"
//! description = "Reads issues and creates implementation plans"
//! command = "analyst-agent"
//! ```

use roundtable_application::OrchestratorConfig;
use roundtable_domain::Participant;
use roundtable_domain::prompt::routing::{DEFAULT_MAX_MESSAGE_LEN, DEFAULT_MAX_RENDERED_LEN};
use roundtable_domain::routing::termination::DEFAULT_MAX_ITERATIONS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors turning a [`FileConfig`] into runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No participants configured")]
    NoParticipants,

    #[error("Missing orchestrator setting: {0}")]
    MissingSetting(&'static str),

    #[error("No oracle command configured")]
    NoOracleCommand,
}

/// Top-level configuration file model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub markers: MarkersSection,
    #[serde(default)]
    pub oracle: OracleSection,
    #[serde(default)]
    pub participants: Vec<ParticipantSection>,
}

/// `[orchestrator]`: loop control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSection {
    /// Participant taking the first turn. Required at runtime.
    #[serde(default)]
    pub first_participant: Option<String>,
    /// Participant whose sign-off ends the run. Required at runtime.
    #[serde(default)]
    pub terminal_authority: Option<String>,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    #[serde(default = "default_max_rendered_history_length")]
    pub max_rendered_history_length: usize,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LEN
}

fn default_max_rendered_history_length() -> usize {
    DEFAULT_MAX_RENDERED_LEN
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            first_participant: None,
            terminal_authority: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_message_length: DEFAULT_MAX_MESSAGE_LEN,
            max_rendered_history_length: DEFAULT_MAX_RENDERED_LEN,
        }
    }
}

/// `[markers]`: termination marker overrides. Empty lists mean "use the
/// built-in defaults".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkersSection {
    #[serde(default)]
    pub rejection: Vec<String>,
    #[serde(default)]
    pub approval: Vec<String>,
}

/// `[oracle]`: the external routing oracle command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OracleSection {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `[[participants]]`: one registered worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantSection {
    pub name: String,
    pub description: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ParticipantSection {
    pub fn profile(&self) -> Participant {
        Participant::new(&self.name, &self.description)
    }
}

impl FileConfig {
    /// Project the file model into the application's orchestrator config.
    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig, ConfigError> {
        if self.participants.is_empty() {
            return Err(ConfigError::NoParticipants);
        }
        let first = self
            .orchestrator
            .first_participant
            .clone()
            .ok_or(ConfigError::MissingSetting("first_participant"))?;
        let authority = self
            .orchestrator
            .terminal_authority
            .clone()
            .ok_or(ConfigError::MissingSetting("terminal_authority"))?;

        let mut config = OrchestratorConfig::new(first, authority)
            .with_max_iterations(self.orchestrator.max_iterations)
            .with_max_message_length(self.orchestrator.max_message_length)
            .with_max_rendered_history_length(self.orchestrator.max_rendered_history_length);
        if !self.markers.rejection.is_empty() {
            config = config.with_rejection_markers(self.markers.rejection.clone());
        }
        if !self.markers.approval.is_empty() {
            config = config.with_approval_markers(self.markers.approval.clone());
        }
        Ok(config)
    }
}
