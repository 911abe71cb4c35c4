//! State shared by the connector, the session, and the controller.

use crate::{LinkConfig, Notifier};
use doorlink_core::ConnectionState;
use doorlink_protocol::DoorState;
use tokio::sync::watch;

/// Configuration, event sink, and observable state of one link.
///
/// Everything that outlives a single connect attempt or session lives
/// here, so a reconnect keeps the same watchers and event stream.
#[derive(Debug)]
pub struct LinkContext {
    config: LinkConfig,
    notifier: Notifier,
    connection: watch::Sender<ConnectionState>,
    door: watch::Sender<DoorState>,
}

impl LinkContext {
    pub fn new(config: LinkConfig, notifier: Notifier) -> Self {
        let (connection, _) = watch::channel(ConnectionState::Idle);
        let (door, _) = watch::channel(DoorState::Unknown);
        Self {
            config,
            notifier,
            connection,
            door,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    pub fn door_state(&self) -> DoorState {
        *self.door.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Watch door state changes.
    pub fn subscribe_door(&self) -> watch::Receiver<DoorState> {
        self.door.subscribe()
    }

    pub(crate) fn set_connection(&self, state: ConnectionState) {
        self.connection.send_replace(state);
    }

    pub(crate) fn set_door(&self, state: DoorState) {
        self.door.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let (notifier, _events) = Notifier::channel();
        let context = LinkContext::new(LinkConfig::default(), notifier);
        assert_eq!(context.connection_state(), ConnectionState::Idle);
        assert_eq!(context.door_state(), DoorState::Unknown);
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let (notifier, _events) = Notifier::channel();
        let context = LinkContext::new(LinkConfig::default(), notifier);
        let mut connection = context.subscribe_connection();

        context.set_connection(ConnectionState::Connecting);
        connection.changed().await.unwrap();
        assert_eq!(*connection.borrow(), ConnectionState::Connecting);
    }
}
