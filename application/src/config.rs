//! Orchestrator configuration: execution loop control.
//!
//! [`OrchestratorConfig`] groups the static parameters that control the
//! turn loop in
//! [`RunConversationUseCase`](crate::use_cases::run_conversation::RunConversationUseCase).
//! Everything is explicit and passed at construction; no component reads
//! process-global state.

use roundtable_domain::prompt::routing::{
    DEFAULT_MAX_MESSAGE_LEN, DEFAULT_MAX_RENDERED_LEN, RenderLimits,
};
use roundtable_domain::routing::termination::{DEFAULT_MAX_ITERATIONS, TerminationPolicy};
use serde::{Deserialize, Serialize};

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LEN
}

fn default_max_rendered_history_length() -> usize {
    DEFAULT_MAX_RENDERED_LEN
}

/// Turn loop control parameters.
///
/// `first_participant` removes oracle latency and variance from the most
/// predictable step (the opening turn); `terminal_authority` names the one
/// participant whose sign-off can end the conversation. Marker lists, when
/// `None`, fall back to the [`TerminationPolicy`] defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Participant that always takes the first turn.
    pub first_participant: String,
    /// Participant whose sign-off can trigger termination.
    pub terminal_authority: String,
    /// Maximum number of completed turns (safety net, default 100).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Per-message truncation length for prompt rendering, in bytes.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Budget for the whole rendered routing prompt, in bytes.
    #[serde(default = "default_max_rendered_history_length")]
    pub max_rendered_history_length: usize,
    /// Override for the rejection marker list (defaults when `None`).
    #[serde(default)]
    pub rejection_markers: Option<Vec<String>>,
    /// Override for the approval marker list (defaults when `None`).
    #[serde(default)]
    pub approval_markers: Option<Vec<String>>,
}

impl OrchestratorConfig {
    pub fn new(
        first_participant: impl Into<String>,
        terminal_authority: impl Into<String>,
    ) -> Self {
        Self {
            first_participant: first_participant.into(),
            terminal_authority: terminal_authority.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_message_length: DEFAULT_MAX_MESSAGE_LEN,
            max_rendered_history_length: DEFAULT_MAX_RENDERED_LEN,
            rejection_markers: None,
            approval_markers: None,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_message_length(mut self, len: usize) -> Self {
        self.max_message_length = len;
        self
    }

    pub fn with_max_rendered_history_length(mut self, len: usize) -> Self {
        self.max_rendered_history_length = len;
        self
    }

    pub fn with_rejection_markers(mut self, markers: Vec<String>) -> Self {
        self.rejection_markers = Some(markers);
        self
    }

    pub fn with_approval_markers(mut self, markers: Vec<String>) -> Self {
        self.approval_markers = Some(markers);
        self
    }

    // ==================== Projections ====================

    /// Build the termination guard configured by this config.
    pub fn termination_policy(&self) -> TerminationPolicy {
        let mut policy = TerminationPolicy::new(self.terminal_authority.clone())
            .with_max_iterations(self.max_iterations);
        if let Some(markers) = &self.rejection_markers {
            policy = policy.with_rejection_markers(markers.clone());
        }
        if let Some(markers) = &self.approval_markers {
            policy = policy.with_approval_markers(markers.clone());
        }
        policy
    }

    /// Prompt rendering budgets configured by this config.
    pub fn render_limits(&self) -> RenderLimits {
        RenderLimits {
            max_message_len: self.max_message_length,
            max_rendered_len: self.max_rendered_history_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::new("Analyst", "Reviewer");
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.first_participant, "Analyst");
        assert_eq!(config.terminal_authority, "Reviewer");
        assert!(config.rejection_markers.is_none());
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::new("Analyst", "Reviewer")
            .with_max_iterations(5)
            .with_max_message_length(80);
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.max_message_length, 80);
    }

    #[test]
    fn test_termination_policy_projection() {
        let config = OrchestratorConfig::new("Analyst", "Reviewer")
            .with_max_iterations(7)
            .with_approval_markers(vec!["ship it".to_string()]);
        let policy = config.termination_policy();
        assert_eq!(policy.max_iterations, 7);
        assert_eq!(policy.terminal_authority, "Reviewer");
        assert_eq!(policy.approval_markers, vec!["ship it".to_string()]);
        // Rejection markers keep their defaults
        assert!(!policy.rejection_markers.is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: OrchestratorConfig = serde_json::from_str(
            r#"{"first_participant": "Analyst", "terminal_authority": "Reviewer"}"#,
        )
        .unwrap();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.max_message_length, 600);
    }
}
