//! Turn routing domain: decisions, termination, and fallback selection.
//!
//! Termination is decided by deterministic pattern matching
//! ([`termination::TerminationPolicy`]), never by the reasoning oracle. The
//! oracle is consulted only for *who speaks next*, and even there
//! [`fallback::RoundRobinFallback`] guarantees a turn can always proceed.

pub mod decision;
pub mod fallback;
pub mod parsing;
pub mod termination;
