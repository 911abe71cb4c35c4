//! Event delivery to the presentation layer.
//!
//! The connector and the session report what happens on the link through a
//! [`Notifier`]. The consumer holds the matching [`LinkEvents`] and drains it
//! at its own pace.
//!
//! ```text
//! ┌───────────┐
//! │ Connector │──► Connection(Succeeded | Failed)
//! └───────────┘         │
//!                       ▼
//! ┌───────────┐   ┌──────────────┐
//! │ Read loop │──►│ mpsc channel │──► LinkEvents ──► UI
//! └───────────┘   └──────────────┘
//!   State(DoorState), Connection(Disconnected)
//! ```
//!
//! The channel is unbounded, so producers never wait on the consumer.
//! Events from one producer arrive in the order they were sent.

use doorlink_protocol::DoorState;
use std::fmt;
use tokio::sync::mpsc;
use tracing::trace;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `disconnect()` was called.
    Requested,
    /// The remote end closed the channel.
    RemoteClosed,
    /// A read failed.
    IoError(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "disconnect requested"),
            Self::RemoteClosed => write!(f, "remote closed the channel"),
            Self::IoError(message) => write!(f, "I/O error: {message}"),
        }
    }
}

/// Connection lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A channel is open and the session is running.
    Succeeded { identifier: String },

    /// The connect attempt ended without a channel.
    Failed { identifier: String, reason: String },

    /// A running session ended. Sent exactly once per session.
    Disconnected { reason: DisconnectReason },
}

/// Everything the link reports to its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinkEvent {
    /// Connection lifecycle change.
    Connection(ConnectionEvent),

    /// The door reported a new state.
    State(DoorState),
}

impl From<ConnectionEvent> for LinkEvent {
    fn from(event: ConnectionEvent) -> Self {
        Self::Connection(event)
    }
}

/// Sending side of the event channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<LinkEvent>,
}

impl Notifier {
    /// Create a connected notifier/receiver pair.
    pub fn channel() -> (Self, LinkEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, LinkEvents { rx })
    }

    /// Deliver an event without waiting.
    ///
    /// If the consumer has gone away the event is dropped.
    pub fn notify(&self, event: impl Into<LinkEvent>) {
        let event = event.into();
        if let Err(mpsc::error::SendError(event)) = self.tx.send(event) {
            trace!("No event consumer, dropping {:?}", event);
        }
    }

    /// Shorthand for [`LinkEvent::State`].
    pub fn state(&self, state: DoorState) {
        self.notify(LinkEvent::State(state));
    }
}

/// Receiving side of the event channel.
#[derive(Debug)]
pub struct LinkEvents {
    rx: mpsc::UnboundedReceiver<LinkEvent>,
}

impl LinkEvents {
    /// Wait for the next event.
    ///
    /// Returns `None` once every [`Notifier`] has been dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<LinkEvent> {
        self.rx.recv().await
    }

    /// Take the next event if one is queued.
    pub fn try_recv(&mut self) -> Option<LinkEvent> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (notifier, mut events) = Notifier::channel();

        notifier.notify(ConnectionEvent::Succeeded {
            identifier: "door".to_string(),
        });
        notifier.state(DoorState::Open);
        notifier.state(DoorState::Closed);

        assert!(matches!(
            events.recv().await,
            Some(LinkEvent::Connection(ConnectionEvent::Succeeded { .. }))
        ));
        assert_eq!(events.recv().await, Some(LinkEvent::State(DoorState::Open)));
        assert_eq!(events.recv().await, Some(LinkEvent::State(DoorState::Closed)));
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn test_notify_without_consumer_does_not_fail() {
        let (notifier, events) = Notifier::channel();
        drop(events);
        notifier.state(DoorState::Locked);
    }

    #[tokio::test]
    async fn test_recv_ends_when_notifiers_dropped() {
        let (notifier, mut events) = Notifier::channel();
        let clone = notifier.clone();
        drop(notifier);
        clone.state(DoorState::Timed);
        drop(clone);

        assert_eq!(events.recv().await, Some(LinkEvent::State(DoorState::Timed)));
        assert_eq!(events.recv().await, None);
    }

    #[test]
    fn test_disconnect_reason_display() {
        assert_eq!(
            DisconnectReason::IoError("reset".to_string()).to_string(),
            "I/O error: reset"
        );
    }
}
