//! Routing decision value objects.

use serde::{Deserialize, Serialize};

/// Outcome of one routing decision, computed at most once per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "name")]
pub enum Decision {
    /// Continue the conversation with the named participant.
    SelectParticipant(String),
    /// Stop the conversation.
    Terminate,
    /// The oracle's reply could not be interpreted (or the oracle failed).
    /// The caller recovers with the fallback strategy.
    Unresolved,
}

impl Decision {
    pub fn is_terminate(&self) -> bool {
        matches!(self, Decision::Terminate)
    }
}

/// Why a conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The terminal authority signed off (approval marker matched).
    Approval,
    /// The iteration cap was reached. A forced stop, not an error.
    IterationCap,
    /// The oracle answered with the termination keyword and no name.
    OracleTerminate,
    /// A participant invocation failed and the run was aborted.
    Failure,
    /// The run was cancelled from outside.
    Cancelled,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Approval => "approval",
            TerminationReason::IterationCap => "iteration_cap",
            TerminationReason::OracleTerminate => "oracle_terminate",
            TerminationReason::Failure => "failure",
            TerminationReason::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_as_str() {
        assert_eq!(TerminationReason::Approval.as_str(), "approval");
        assert_eq!(TerminationReason::IterationCap.as_str(), "iteration_cap");
    }

    #[test]
    fn test_decision_is_terminate() {
        assert!(Decision::Terminate.is_terminate());
        assert!(!Decision::Unresolved.is_terminate());
        assert!(!Decision::SelectParticipant("Coder".to_string()).is_terminate());
    }
}
