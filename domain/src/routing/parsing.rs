//! Oracle response parsing for turn routing.
//!
//! Extracts a structured [`Decision`] from the oracle's free-form reply.
//! Pure text matching, conservative on ambiguity: anything that names no
//! registered participant and no termination keyword is `Unresolved`, and
//! recovery belongs to the caller's fallback strategy.

use crate::conversation::entities::Participant;
use crate::routing::decision::Decision;
use crate::routing::termination::TERMINATE_KEYWORD;

/// Parse the oracle's raw decision text.
///
/// Scans registered participant names in registration order with
/// case-insensitive substring matching; the first name that appears in the
/// reply wins, so registration order is the deterministic tie-breaker when
/// the oracle mentions several names. A reply containing the termination
/// keyword but no participant name is a [`Decision::Terminate`].
///
/// The raw text is trimmed before matching; an empty reply is
/// [`Decision::Unresolved`].
pub fn parse_decision(raw: &str, participants: &[Participant]) -> Decision {
    let text = raw.trim();
    if text.is_empty() {
        return Decision::Unresolved;
    }
    let text_lower = text.to_lowercase();

    for participant in participants {
        if text_lower.contains(&participant.name.to_lowercase()) {
            return Decision::SelectParticipant(participant.name.clone());
        }
    }

    if text_lower.contains(&TERMINATE_KEYWORD.to_lowercase()) {
        return Decision::Terminate;
    }

    Decision::Unresolved
}
