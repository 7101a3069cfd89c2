//! Port definitions: interfaces the application layer consumes.
//!
//! Implementations (adapters) live in the infrastructure layer; test
//! doubles live next to the use case tests.

pub mod oracle;
pub mod participant_agent;
pub mod turn_events;
