//! Append-only conversation history.
//!
//! [`History`] is the only shared mutable state in the orchestrator. It has
//! a single writer (the orchestration loop); every other component sees a
//! read-only snapshot. Messages are never removed or reordered; the
//! sequence index is the sole ordering key and must match insertion order.

use crate::conversation::entities::{Author, Message};
use thiserror::Error;

/// Error appending to a [`History`].
///
/// A sequence mismatch is a programmer error in the caller (the loop is the
/// only writer and assigns indices via [`History::next_seq`]), surfaced as a
/// typed error rather than a panic so it can be logged and aborted cleanly.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HistoryError {
    #[error("sequence index mismatch: expected {expected}, got {got}")]
    SequenceMismatch { expected: usize, got: usize },
}

/// Ordered, append-only log of turn messages.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history seeded with the initiator's opening message.
    pub fn with_opening(text: impl Into<String>) -> Self {
        let mut history = Self::new();
        // Seq 0 by construction, append cannot fail on an empty history.
        let _ = history.append(Message::initiator(text, 0));
        history
    }

    /// The sequence index the next appended message must carry.
    pub fn next_seq(&self) -> usize {
        self.messages.len()
    }

    /// Append a message.
    ///
    /// Fails only if the message's sequence index is not the next expected
    /// one (duplicate or out-of-order index).
    pub fn append(&mut self, message: Message) -> Result<(), HistoryError> {
        let expected = self.next_seq();
        if message.seq != expected {
            return Err(HistoryError::SequenceMismatch {
                expected,
                got: message.seq,
            });
        }
        self.messages.push(message);
        Ok(())
    }

    /// Read-only ordered view of all messages.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recently appended message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True if the history holds nothing beyond the initiator's opening
    /// message, the state in which routing is fully deterministic.
    pub fn only_opening(&self) -> bool {
        self.messages.len() == 1 && self.messages[0].author.is_initiator()
    }

    /// Name of the last participant to speak, skipping initiator messages.
    pub fn last_speaker(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.author.participant_name())
    }
}

/// Find the last participant speaker in a message slice.
///
/// Snapshot counterpart of [`History::last_speaker`] for components that
/// only hold a read-only view.
pub fn last_speaker(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find_map(|m| m.author.participant_name())
}

/// True if the slice holds nothing beyond the initiator's opening message.
pub fn only_opening(messages: &[Message]) -> bool {
    messages.len() == 1 && matches!(messages[0].author, Author::Initiator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_in_order() {
        let mut history = History::with_opening("start task");
        assert_eq!(history.len(), 1);
        assert!(history.only_opening());

        let seq = history.next_seq();
        history
            .append(Message::participant("Analyst", "plan", seq))
            .unwrap();

        assert_eq!(history.len(), 2);
        assert!(!history.only_opening());
        assert_eq!(history.last().unwrap().text, "plan");
    }

    #[test]
    fn test_append_rejects_duplicate_seq() {
        let mut history = History::with_opening("start");
        let err = history
            .append(Message::participant("Analyst", "plan", 0))
            .unwrap_err();
        assert_eq!(
            err,
            HistoryError::SequenceMismatch {
                expected: 1,
                got: 0
            }
        );
        // History is untouched after a failed append
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_append_rejects_gap() {
        let mut history = History::new();
        let err = history
            .append(Message::initiator("start", 5))
            .unwrap_err();
        assert_eq!(
            err,
            HistoryError::SequenceMismatch {
                expected: 0,
                got: 5
            }
        );
    }

    #[test]
    fn test_last_speaker_skips_initiator() {
        let mut history = History::with_opening("start");
        assert_eq!(history.last_speaker(), None);

        let seq = history.next_seq();
        history
            .append(Message::participant("Coder", "done", seq))
            .unwrap();
        assert_eq!(history.last_speaker(), Some("Coder"));
        assert_eq!(last_speaker(history.snapshot()), Some("Coder"));
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let mut history = History::with_opening("start");
        for (i, name) in ["Analyst", "Coder", "Reviewer"].iter().enumerate() {
            history
                .append(Message::participant(*name, format!("msg {i}"), i + 1))
                .unwrap();
        }
        let authors: Vec<_> = history
            .snapshot()
            .iter()
            .map(|m| m.author.display_name().to_string())
            .collect();
        assert_eq!(authors, vec!["initiator", "Analyst", "Coder", "Reviewer"]);
    }
}
