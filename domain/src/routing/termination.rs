//! Deterministic termination guard.
//!
//! These checks extract a stop/continue decision from free-form sign-off
//! text. They are pure domain logic: no I/O, no oracle call, just text
//! pattern matching plus a hard iteration cap. Pattern matching, not the
//! oracle, is authoritative for termination.

use crate::conversation::entities::Message;
use crate::conversation::history::only_opening;
use crate::routing::decision::TerminationReason;
use serde::{Deserialize, Serialize};

/// Keyword the oracle may answer with to request termination directly.
pub const TERMINATE_KEYWORD: &str = "TERMINATE";

/// Default maximum number of completed turns before forced termination.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

fn default_rejection_markers() -> Vec<String> {
    [
        "cannot approve",
        "cannot be approved",
        "not approved",
        "requires changes",
        "request changes",
        "needs changes",
        "issues found",
        "rejected",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_approval_markers() -> Vec<String> {
    [
        "approved",
        "approve",
        "pull request created",
        "created pull request",
        "lgtm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Deterministic predicate governing when the conversation stops.
///
/// Evaluated before any participant is invoked, in this exact order,
/// short-circuiting:
///
/// 1. iteration cap reached → stop (safety net, always wins);
/// 2. history empty or only the opening message → continue (too early);
/// 3. last author is not the terminal authority → continue;
/// 4. rejection markers on the last message → continue. Checked *before*
///    approval markers so "cannot be approved" is never misread as approval;
/// 5. approval markers on the last message → stop.
///
/// Marker lists are configuration, not hardcoded constants: the defaults are
/// English and informally chosen, deployments can override them. Single-word
/// markers must match at a sentence boundary (start of text, or after
/// `.`/`!`/newline plus optional whitespace, followed by a non-alphanumeric
/// or end); multi-word phrases match as plain case-insensitive substrings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminationPolicy {
    /// The one participant whose sign-off can end the conversation.
    pub terminal_authority: String,
    /// Maximum number of completed turns.
    pub max_iterations: usize,
    /// Markers that veto termination, checked first.
    #[serde(default = "default_rejection_markers")]
    pub rejection_markers: Vec<String>,
    /// Markers that signal sign-off.
    #[serde(default = "default_approval_markers")]
    pub approval_markers: Vec<String>,
}

impl TerminationPolicy {
    pub fn new(terminal_authority: impl Into<String>) -> Self {
        Self {
            terminal_authority: terminal_authority.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rejection_markers: default_rejection_markers(),
            approval_markers: default_approval_markers(),
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_rejection_markers(mut self, markers: Vec<String>) -> Self {
        self.rejection_markers = markers;
        self
    }

    pub fn with_approval_markers(mut self, markers: Vec<String>) -> Self {
        self.approval_markers = markers;
        self
    }

    /// Decide whether the conversation is finished.
    ///
    /// `iterations` is the number of *completed* turns so far. Returns the
    /// termination reason, or `None` to continue.
    pub fn should_terminate(
        &self,
        messages: &[Message],
        iterations: usize,
    ) -> Option<TerminationReason> {
        if iterations >= self.max_iterations {
            return Some(TerminationReason::IterationCap);
        }

        if messages.is_empty() || only_opening(messages) {
            return None;
        }

        let last = messages.last()?;
        let authored_by_authority = last
            .author
            .participant_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(&self.terminal_authority));
        if !authored_by_authority {
            return None;
        }

        let text = last.text.to_lowercase();

        if self
            .rejection_markers
            .iter()
            .any(|marker| text.contains(&marker.to_lowercase()))
        {
            return None;
        }

        if self
            .approval_markers
            .iter()
            .any(|marker| marker_matches(&text, &marker.to_lowercase()))
        {
            return Some(TerminationReason::Approval);
        }

        None
    }
}

/// Match an approval marker against lowercased text.
///
/// Multi-word phrases match anywhere; bare sign-off words only at a
/// sentence boundary, so "approved" inside a longer negative phrase that
/// slipped past the rejection list still doesn't trigger.
fn marker_matches(text: &str, marker: &str) -> bool {
    if marker.contains(char::is_whitespace) {
        text.contains(marker)
    } else {
        sign_off_at_boundary(text, marker)
    }
}

/// True if `word` occurs at a sentence boundary in `text`.
///
/// Boundary before: start of text, or `.`/`!`/newline with optional
/// whitespace in between. Boundary after: end of text or any
/// non-alphanumeric character.
fn sign_off_at_boundary(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let mut search_from = 0;
    while let Some(pos) = text[search_from..].find(word) {
        let at = search_from + pos;
        let end = at + word.len();
        if boundary_before(text, at) && boundary_after(text, end) {
            return true;
        }
        search_from = end;
    }
    false
}

fn boundary_before(text: &str, at: usize) -> bool {
    let mut prev = text[..at].chars().rev();
    loop {
        match prev.next() {
            None => return true,
            Some(c) if c == '\n' || c == '.' || c == '!' => return true,
            Some(c) if c.is_whitespace() => continue,
            Some(_) => return false,
        }
    }
}

fn boundary_after(text: &str, end: usize) -> bool {
    match text[end..].chars().next() {
        None => true,
        Some(c) => !c.is_alphanumeric(),
    }
}
