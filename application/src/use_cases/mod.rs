//! Application use cases.

pub mod run_conversation;
pub mod select_speaker;
