//! Fallback speaker selection.
//!
//! When the oracle is unavailable or its reply is unparseable, the turn must
//! still proceed. Different strategies can be plugged in; the strategy is
//! injected into the speaker selector rather than inherited from it.

use crate::conversation::entities::{Message, Participant};
use crate::conversation::history::last_speaker;

/// Deterministic strategy for picking the next speaker without an oracle.
pub trait FallbackStrategy: Send + Sync {
    /// Get the name of this strategy
    fn name(&self) -> &'static str;

    /// Pick the next participant. `participants` is never empty when called
    /// by the selector.
    fn next(&self, messages: &[Message], participants: &[Participant]) -> Participant;
}

/// Plain round-robin over the registration order.
///
/// Rotates from whoever spoke last; starts at the first registered
/// participant when only the initiator has spoken. Initiator messages do not
/// advance the rotation. A last speaker that is no longer registered (which
/// would be a roster bug) also restarts at the first participant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinFallback;

impl FallbackStrategy for RoundRobinFallback {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn next(&self, messages: &[Message], participants: &[Participant]) -> Participant {
        let next_index = last_speaker(messages)
            .and_then(|name| participants.iter().position(|p| p.matches_name(name)))
            .map(|i| (i + 1) % participants.len())
            .unwrap_or(0);
        participants[next_index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("Analyst", "plans"),
            Participant::new("Coder", "codes"),
            Participant::new("Reviewer", "reviews"),
        ]
    }

    #[test]
    fn test_starts_at_first_participant() {
        let messages = vec![Message::initiator("start", 0)];
        let next = RoundRobinFallback.next(&messages, &roster());
        assert_eq!(next.name, "Analyst");
    }

    #[test]
    fn test_rotates_in_registration_order() {
        let messages = vec![
            Message::initiator("start", 0),
            Message::participant("Analyst", "plan", 1),
        ];
        assert_eq!(RoundRobinFallback.next(&messages, &roster()).name, "Coder");
    }

    #[test]
    fn test_wraps_around() {
        let messages = vec![
            Message::initiator("start", 0),
            Message::participant("Reviewer", "needs changes", 1),
        ];
        assert_eq!(
            RoundRobinFallback.next(&messages, &roster()).name,
            "Analyst"
        );
    }

    #[test]
    fn test_unknown_last_speaker_restarts() {
        let messages = vec![Message::participant("Ghost", "boo", 0)];
        assert_eq!(
            RoundRobinFallback.next(&messages, &roster()).name,
            "Analyst"
        );
    }
}
