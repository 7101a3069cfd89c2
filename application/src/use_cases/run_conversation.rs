//! Run Conversation use case.
//!
//! Drives the turn cycle: guard, select, invoke the chosen participant,
//! append, repeat. Turns are strictly sequential; one active speaker at a
//! time, and no turn begins before the previous turn's messages are
//! appended. The history is owned here, as the sole writer; every other
//! component sees read-only snapshots.

use crate::config::OrchestratorConfig;
use crate::ports::oracle::DecisionOracle;
use crate::ports::participant_agent::{InvokeError, ParticipantAgent};
use crate::ports::turn_events::{ChannelEventSink, TurnEvent, TurnEventSink, TurnEventStream};
use crate::use_cases::select_speaker::{Selection, SpeakerSelector};
use roundtable_domain::conversation::history::HistoryError;
use roundtable_domain::prompt::routing::RoutingPrompt;
use roundtable_domain::routing::decision::TerminationReason;
use roundtable_domain::routing::fallback::{FallbackStrategy, RoundRobinFallback};
use roundtable_domain::{History, Message, Participant};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur running a conversation.
#[derive(Error, Debug)]
pub enum RunConversationError {
    #[error("No participants registered")]
    NoParticipants,

    #[error("Duplicate participant name: {0}")]
    DuplicateParticipant(String),

    #[error("First participant not registered: {0}")]
    UnknownFirstParticipant(String),

    #[error("Terminal authority not registered: {0}")]
    UnknownTerminalAuthority(String),

    #[error("Selected participant not registered: {0}")]
    UnknownParticipant(String),

    #[error("Participant {name} failed: {source}")]
    ParticipantInvocationFailed {
        name: String,
        #[source]
        source: InvokeError,
    },

    #[error("History violation: {0}")]
    History(#[from] HistoryError),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Why the conversation ended.
    pub reason: TerminationReason,
    /// Number of completed turns.
    pub iterations: usize,
    /// The full conversation log.
    pub history: History,
}

/// Orchestration loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Start,
    Routing,
    Terminated(TerminationReason),
}

/// Use case for running a turn-based conversation to completion.
///
/// Participants and configuration are fixed at construction and immutable
/// afterwards. One oracle decision at most per turn, one participant
/// invocation at most per turn, and the iteration counter increases by
/// exactly one per completed turn.
pub struct RunConversationUseCase {
    agents: Vec<Arc<dyn ParticipantAgent>>,
    participants: Vec<Participant>,
    oracle: Arc<dyn DecisionOracle>,
    config: OrchestratorConfig,
    fallback: Arc<dyn FallbackStrategy>,
    cancellation_token: Option<CancellationToken>,
}

impl RunConversationUseCase {
    /// Validates the roster (non-empty, unique names) and resolves the
    /// configured first participant and terminal authority against it.
    pub fn new(
        agents: Vec<Arc<dyn ParticipantAgent>>,
        oracle: Arc<dyn DecisionOracle>,
        config: OrchestratorConfig,
    ) -> Result<Self, RunConversationError> {
        if agents.is_empty() {
            return Err(RunConversationError::NoParticipants);
        }

        let participants: Vec<Participant> =
            agents.iter().map(|a| a.profile().clone()).collect();

        for (i, p) in participants.iter().enumerate() {
            if participants[..i].iter().any(|q| q.matches_name(&p.name)) {
                return Err(RunConversationError::DuplicateParticipant(p.name.clone()));
            }
        }

        // Resolve configured names to their canonical roster spelling.
        let mut config = config;
        config.first_participant = participants
            .iter()
            .find(|p| p.matches_name(&config.first_participant))
            .map(|p| p.name.clone())
            .ok_or_else(|| {
                RunConversationError::UnknownFirstParticipant(config.first_participant.clone())
            })?;
        config.terminal_authority = participants
            .iter()
            .find(|p| p.matches_name(&config.terminal_authority))
            .map(|p| p.name.clone())
            .ok_or_else(|| {
                RunConversationError::UnknownTerminalAuthority(config.terminal_authority.clone())
            })?;

        Ok(Self {
            agents,
            participants,
            oracle,
            config,
            fallback: Arc::new(RoundRobinFallback),
            cancellation_token: None,
        })
    }

    /// Swap the fallback selection strategy (round-robin by default).
    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackStrategy>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Run the conversation to completion, reporting turn events to `sink`.
    pub async fn execute(
        &self,
        initiator_text: &str,
        sink: &dyn TurnEventSink,
    ) -> Result<RunOutcome, RunConversationError> {
        let policy = self.config.termination_policy();
        let template = RoutingPrompt::new(self.participants.clone())
            .with_limits(self.config.render_limits());
        let mut selector = SpeakerSelector::new(
            self.participants.clone(),
            Arc::clone(&self.oracle),
            Box::new(FallbackAdapter(Arc::clone(&self.fallback))),
            template,
            self.config.first_participant.clone(),
        );

        let mut history = History::new();
        let mut iterations = 0usize;
        let mut state = LoopState::Start;

        info!(
            participants = self.participants.len(),
            max_iterations = self.config.max_iterations,
            "Starting conversation"
        );

        let reason = loop {
            match state {
                LoopState::Start => {
                    history = History::with_opening(initiator_text);
                    state = LoopState::Routing;
                }
                LoopState::Routing => {
                    if let Err(e) = self.check_cancelled(sink) {
                        return Err(e);
                    }

                    if let Some(reason) = policy.should_terminate(history.snapshot(), iterations)
                    {
                        state = LoopState::Terminated(reason);
                        continue;
                    }

                    debug!(turn = iterations + 1, "Routing next turn");
                    let selection = self
                        .cancellable(selector.select(iterations, history.snapshot()), sink)
                        .await?;

                    let name = match selection {
                        Selection::Stop => {
                            state = LoopState::Terminated(TerminationReason::OracleTerminate);
                            continue;
                        }
                        Selection::Speak(name) => name,
                    };

                    sink.on_event(&TurnEvent::SpeakerSelected { name: name.clone() });

                    let agent = self
                        .agents
                        .iter()
                        .find(|a| a.profile().matches_name(&name))
                        .ok_or_else(|| RunConversationError::UnknownParticipant(name.clone()))?;

                    let invocation = self
                        .cancellable(agent.invoke(history.snapshot()), sink)
                        .await?;
                    let bodies = match invocation {
                        Ok(bodies) => bodies,
                        Err(e) => {
                            warn!(participant = %name, error = %e, "Participant invocation failed, aborting run");
                            sink.on_event(&TurnEvent::Terminated {
                                reason: TerminationReason::Failure,
                            });
                            return Err(RunConversationError::ParticipantInvocationFailed {
                                name,
                                source: e,
                            });
                        }
                    };

                    // A failed turn appends nothing; from here on the turn
                    // commits atomically.
                    let mut appended = Vec::with_capacity(bodies.len());
                    for body in bodies {
                        let message = Message::participant(&name, body, history.next_seq());
                        history.append(message.clone())?;
                        appended.push(message);
                    }
                    sink.on_event(&TurnEvent::MessagesAppended { messages: appended });

                    iterations += 1;
                }
                LoopState::Terminated(reason) => {
                    sink.on_event(&TurnEvent::Terminated { reason });
                    info!(reason = %reason, iterations, "Conversation terminated");
                    break reason;
                }
            }
        };

        Ok(RunOutcome {
            reason,
            iterations,
            history,
        })
    }

    /// Run the conversation in a background task, returning the event
    /// stream. The stream ends with the `Terminated` event.
    pub fn execute_streaming(self: Arc<Self>, initiator_text: String) -> TurnEventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelEventSink::new(tx);
        tokio::spawn(async move {
            if let Err(e) = self.execute(&initiator_text, &sink).await {
                warn!(error = %e, "Conversation run failed");
            }
        });
        TurnEventStream::new(rx)
    }

    fn check_cancelled(&self, sink: &dyn TurnEventSink) -> Result<(), RunConversationError> {
        if let Some(token) = &self.cancellation_token
            && token.is_cancelled()
        {
            sink.on_event(&TurnEvent::Terminated {
                reason: TerminationReason::Cancelled,
            });
            return Err(RunConversationError::Cancelled);
        }
        Ok(())
    }

    /// Await `fut`, aborting early if the cancellation token fires. Both
    /// suspension points (oracle ask, participant invoke) go through here,
    /// so a mid-turn cancellation abandons the turn without appending
    /// partial results.
    async fn cancellable<T>(
        &self,
        fut: impl Future<Output = T>,
        sink: &dyn TurnEventSink,
    ) -> Result<T, RunConversationError> {
        match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        sink.on_event(&TurnEvent::Terminated {
                            reason: TerminationReason::Cancelled,
                        });
                        Err(RunConversationError::Cancelled)
                    }
                    value = fut => Ok(value),
                }
            }
            None => Ok(fut.await),
        }
    }
}

/// Bridges the shared `Arc<dyn FallbackStrategy>` into the boxed strategy
/// the selector owns.
struct FallbackAdapter(Arc<dyn FallbackStrategy>);

impl FallbackStrategy for FallbackAdapter {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn next(&self, messages: &[Message], participants: &[Participant]) -> Participant {
        self.0.next(messages, participants)
    }
}
