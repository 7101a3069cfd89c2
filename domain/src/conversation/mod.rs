//! Conversation domain module: participants, messages, and the turn log.
//!
//! A conversation is owned by exactly one writer (the orchestration loop in
//! the application layer). Everything here is either immutable after
//! construction ([`entities::Message`], [`entities::Participant`]) or
//! append-only ([`history::History`]).

pub mod entities;
pub mod history;
