//! Application layer for roundtable
//!
//! This crate contains use cases, port definitions, and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestratorConfig;
pub use ports::{
    oracle::{DecisionOracle, OracleError},
    participant_agent::{InvokeError, ParticipantAgent},
    turn_events::{NoTurnEvents, TurnEvent, TurnEventSink, TurnEventStream},
};
pub use use_cases::run_conversation::{
    RunConversationError, RunConversationUseCase, RunOutcome,
};
pub use use_cases::select_speaker::{Selection, SpeakerSelector};
