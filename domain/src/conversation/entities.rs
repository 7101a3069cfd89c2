//! Conversation domain entities

use serde::{Deserialize, Serialize};

/// Author of a message in a conversation.
///
/// The initiator is a sentinel author: it is not a registered participant
/// and never takes a turn, it only seeds the conversation with the opening
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "name")]
pub enum Author {
    /// The external initiator that started the conversation.
    Initiator,
    /// A registered participant, identified by its unique name.
    Participant(String),
}

impl Author {
    /// The display name used when rendering `[author]: text` lines.
    pub fn display_name(&self) -> &str {
        match self {
            Author::Initiator => "initiator",
            Author::Participant(name) => name,
        }
    }

    /// Returns the participant name if this author is a participant.
    pub fn participant_name(&self) -> Option<&str> {
        match self {
            Author::Initiator => None,
            Author::Participant(name) => Some(name),
        }
    }

    pub fn is_initiator(&self) -> bool {
        matches!(self, Author::Initiator)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A message in a conversation (Entity)
///
/// Immutable once appended to a [`History`](crate::History). The sequence
/// index is the sole ordering key and is assigned by the history at append
/// time via [`History::next_seq`](crate::History::next_seq).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: Author,
    pub text: String,
    pub seq: usize,
}

impl Message {
    /// Create the initiator's opening message.
    pub fn initiator(text: impl Into<String>, seq: usize) -> Self {
        Self {
            author: Author::Initiator,
            text: text.into(),
            seq,
        }
    }

    /// Create a message authored by a participant.
    pub fn participant(name: impl Into<String>, text: impl Into<String>, seq: usize) -> Self {
        Self {
            author: Author::Participant(name.into()),
            text: text.into(),
            seq,
        }
    }
}

/// A registered worker in the conversation (value object).
///
/// The capability description is an opaque string used only for prompt
/// rendering; the invocation handle lives behind the application layer's
/// `ParticipantAgent` port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique name, matched case-insensitively during routing.
    pub name: String,
    /// Short capability description shown to the decision oracle.
    pub description: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Case-insensitive name equality, the comparison used everywhere a
    /// participant is looked up by name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
