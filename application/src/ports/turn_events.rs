//! Turn event port: observability for the orchestration loop.
//!
//! Every loop transition is reported as a [`TurnEvent`]. Event emission
//! carries no control-flow semantics: sinks observe, they never steer.
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port carries the structured turn
//! stream for UIs and transcript logging.

use roundtable_domain::{Message, routing::decision::TerminationReason};
use serde::Serialize;
use tokio::sync::mpsc;

/// An observable event from the orchestration loop.
///
/// A run's event stream is a sequence of `SpeakerSelected` /
/// `MessagesAppended` pairs closed by exactly one `Terminated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TurnEvent {
    /// The next speaker has been chosen for the current turn.
    SpeakerSelected { name: String },
    /// The invoked participant's messages were appended to the history.
    MessagesAppended { messages: Vec<Message> },
    /// The run is over; no further events follow.
    Terminated { reason: TerminationReason },
}

/// Sink for turn events.
///
/// The `on_event` method is intentionally synchronous and non-fallible so
/// observers cannot disrupt the turn loop.
pub trait TurnEventSink: Send + Sync {
    fn on_event(&self, event: &TurnEvent);
}

/// No-op sink for tests and when observation is not needed.
pub struct NoTurnEvents;

impl TurnEventSink for NoTurnEvents {
    fn on_event(&self, _event: &TurnEvent) {}
}

/// Sink that forwards events into an unbounded channel.
///
/// Used by the streaming entry point; a dropped receiver just means nobody
/// is watching anymore, so send failures are ignored.
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<TurnEvent>,
}

impl ChannelEventSink {
    pub fn new(sender: mpsc::UnboundedSender<TurnEvent>) -> Self {
        Self { sender }
    }
}

impl TurnEventSink for ChannelEventSink {
    fn on_event(&self, event: &TurnEvent) {
        let _ = self.sender.send(event.clone());
    }
}

/// Handle for receiving the turn events of a running conversation.
///
/// Wraps an `mpsc::UnboundedReceiver<TurnEvent>` and provides convenience
/// methods for consuming the stream. The stream ends after the
/// `Terminated` event.
pub struct TurnEventStream {
    pub receiver: mpsc::UnboundedReceiver<TurnEvent>,
}

impl TurnEventStream {
    pub fn new(receiver: mpsc::UnboundedReceiver<TurnEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event, or `None` when the stream is closed.
    pub async fn next(&mut self) -> Option<TurnEvent> {
        self.receiver.recv().await
    }

    /// Drain the stream into a vector, consuming events until it closes.
    pub async fn collect_events(mut self) -> Vec<TurnEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            let done = matches!(event, TurnEvent::Terminated { .. });
            events.push(event);
            if done {
                break;
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_forwards_events() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelEventSink::new(tx);
        sink.on_event(&TurnEvent::SpeakerSelected {
            name: "Analyst".to_string(),
        });
        sink.on_event(&TurnEvent::Terminated {
            reason: TerminationReason::Approval,
        });

        let events = TurnEventStream::new(rx).collect_events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            TurnEvent::SpeakerSelected {
                name: "Analyst".to_string()
            }
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = TurnEvent::Terminated {
            reason: TerminationReason::IterationCap,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "terminated");
        assert_eq!(json["reason"], "iteration_cap");
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ChannelEventSink::new(tx);
        // Must not panic
        sink.on_event(&TurnEvent::SpeakerSelected {
            name: "Coder".to_string(),
        });
    }
}
