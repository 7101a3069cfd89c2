//! Prompt rendering for the decision oracle.

pub mod routing;
