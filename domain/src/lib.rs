//! Domain layer for roundtable
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Conversation
//!
//! A conversation is an append-only [`History`] of [`Message`]s produced by
//! a fixed roster of [`Participant`]s, kicked off by a single initiator
//! message. One participant speaks per turn; insertion order is
//! authoritative.
//!
//! ## Routing
//!
//! After every turn a [`Decision`] is made: continue with a named
//! participant, or terminate. Termination is governed by the deterministic
//! [`TerminationPolicy`] (marker matching plus an iteration cap); the next
//! speaker comes from a reasoning oracle, with [`RoundRobinFallback`] as the
//! deterministic safety net when the oracle is unavailable or unparseable.

pub mod conversation;
pub mod prompt;
pub mod routing;
pub mod util;

// Re-export commonly used types
pub use conversation::{
    entities::{Author, Message, Participant},
    history::{History, HistoryError},
};
pub use prompt::routing::{RenderLimits, RoutingPrompt};
pub use routing::{
    decision::{Decision, TerminationReason},
    fallback::{FallbackStrategy, RoundRobinFallback},
    parsing::parse_decision,
    termination::{TERMINATE_KEYWORD, TerminationPolicy},
};
