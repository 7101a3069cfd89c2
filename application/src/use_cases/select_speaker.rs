//! Speaker selection.
//!
//! Chooses the next participant when the termination guard says "continue".
//! The oracle is consulted for at most one decision per turn; everything
//! else here is deterministic: the opening turn shortcut, the parse of the
//! oracle's reply, and the injected fallback strategy when the oracle is
//! unavailable or unparseable. A turn can never fail in this module.

use crate::ports::oracle::DecisionOracle;
use roundtable_domain::conversation::history::only_opening;
use roundtable_domain::prompt::routing::RoutingPrompt;
use roundtable_domain::routing::fallback::FallbackStrategy;
use roundtable_domain::routing::parsing::parse_decision;
use roundtable_domain::{Decision, Message, Participant};
use std::sync::Arc;
use tracing::{debug, warn};

/// A resolved selection: either a concrete next speaker or a stop request.
///
/// `Unresolved` never escapes the selector; it is recovered here via the
/// fallback strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Invoke the named participant next.
    Speak(String),
    /// The oracle asked to stop and named no participant.
    Stop,
}

/// Turns the oracle's raw text (or a deterministic override) into a
/// concrete next participant.
///
/// The decision is memoized per turn, keyed by the turn number: asking
/// again within the same turn returns the cached selection without a
/// second oracle call, while the next turn always recomputes. History
/// length is not a usable key here since a turn may legally append zero
/// messages. The oracle call is costly and its result must stay consistent
/// within one turn cycle.
pub struct SpeakerSelector {
    participants: Vec<Participant>,
    oracle: Arc<dyn DecisionOracle>,
    fallback: Box<dyn FallbackStrategy>,
    template: RoutingPrompt,
    first_participant: String,
    cached: Option<(usize, Selection)>,
}

impl SpeakerSelector {
    /// `first_participant` must be the canonical name of a registered
    /// participant; the owning use case validates this at construction.
    pub fn new(
        participants: Vec<Participant>,
        oracle: Arc<dyn DecisionOracle>,
        fallback: Box<dyn FallbackStrategy>,
        template: RoutingPrompt,
        first_participant: String,
    ) -> Self {
        Self {
            participants,
            oracle,
            fallback,
            template,
            first_participant,
            cached: None,
        }
    }

    /// Decide who speaks next, memoized within the current turn.
    ///
    /// `turn` is the number of completed turns so far; the caller passes the
    /// same value for repeated queries within one turn cycle.
    pub async fn select(&mut self, turn: usize, messages: &[Message]) -> Selection {
        if let Some((at_turn, selection)) = &self.cached
            && *at_turn == turn
        {
            debug!("Reusing cached routing decision for this turn");
            return selection.clone();
        }

        let selection = self.compute(messages).await;
        self.cached = Some((turn, selection.clone()));
        selection
    }

    async fn compute(&self, messages: &[Message]) -> Selection {
        // The opening turn is fully predictable; skip the oracle entirely.
        if only_opening(messages) {
            debug!(
                first = %self.first_participant,
                "Opening turn, selecting the configured first participant"
            );
            return Selection::Speak(self.first_participant.clone());
        }

        let prompt = self.template.render(messages);
        let decision = match self.oracle.ask(&prompt).await {
            Ok(raw) => parse_decision(&raw, &self.participants),
            Err(e) => {
                warn!(error = %e, "Decision oracle unavailable");
                Decision::Unresolved
            }
        };

        match decision {
            Decision::SelectParticipant(name) => Selection::Speak(name),
            Decision::Terminate => Selection::Stop,
            Decision::Unresolved => {
                let pick = self.fallback.next(messages, &self.participants);
                warn!(
                    strategy = self.fallback.name(),
                    fallback = %pick.name,
                    "Unresolved routing decision, using fallback strategy"
                );
                Selection::Speak(pick.name)
            }
        }
    }
}
