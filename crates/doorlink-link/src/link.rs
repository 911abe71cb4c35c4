//! Connection lifecycle controller.
//!
//! [`DoorLink`] is what a front end holds. It owns at most one connect
//! attempt or session at a time and enforces the disconnect-before-reconnect
//! rule: a new [`connect`](DoorLink::connect) is refused while an attempt is
//! in flight or a session is live.
//!
//! ```text
//!          connect()            success
//!   Idle ────────────► Connecting ───────► Active(Session)
//!    ▲                     │                    │
//!    │      failure        │                    │ disconnect() / read failure
//!    ├─────────────────────┘                    │
//!    └──────────── Closing ◄────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use doorlink_link::{DoorLink, LinkConfig, LinkEvent, SystemTransport};
//! use doorlink_protocol::Command;
//!
//! # async fn example() -> doorlink_link::Result<()> {
//! let (link, mut events) = DoorLink::new(SystemTransport::default(), LinkConfig::default());
//!
//! link.connect("tcp://192.168.4.1:23").await?;
//! link.write(Command::Lock).await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let LinkEvent::State(state) = event {
//!         println!("door is {state}");
//!     }
//! }
//!
//! link.shutdown().await;
//! # Ok(())
//! # }
//! ```

use crate::connector::Connector;
use crate::context::LinkContext;
use crate::notifier::{LinkEvents, Notifier};
use crate::transports::AnyTransport;
use crate::{LinkConfig, LinkError, Result, Session};
use doorlink_core::ConnectionState;
use doorlink_protocol::{Command, DoorState};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

enum Slot {
    Idle,
    Connecting {
        attempt: u64,
        cancel: CancellationToken,
        done: CancellationToken,
    },
    Active(Arc<Session>),
    Closing,
}

struct Shared {
    transport: Arc<AnyTransport>,
    context: Arc<LinkContext>,
    slot: Mutex<Slot>,
    attempts: AtomicU64,
}

/// Owns the connection to one door.
pub struct DoorLink {
    shared: Arc<Shared>,
}

impl DoorLink {
    /// Create a link and the event stream it reports to.
    pub fn new(transport: impl Into<AnyTransport>, config: LinkConfig) -> (Self, LinkEvents) {
        let (notifier, events) = Notifier::channel();
        let shared = Arc::new(Shared {
            transport: Arc::new(transport.into()),
            context: Arc::new(LinkContext::new(config, notifier)),
            slot: Mutex::new(Slot::Idle),
            attempts: AtomicU64::new(0),
        });
        (Self { shared }, events)
    }

    /// Connect to the device named by `identifier`.
    ///
    /// The attempt runs on its own task; this future only waits for it.
    /// Success and failure are also reported as connection events.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Configuration`] if the link settings are invalid
    /// - [`LinkError::AlreadyConnected`] if an attempt or session holds the link
    /// - any error of [`Connector::connect`]
    /// - [`LinkError::Cancelled`] if [`disconnect`](Self::disconnect) ran
    ///   before the new session could be installed
    pub async fn connect(&self, identifier: &str) -> Result<()> {
        self.shared.context.config().validate()?;

        let task = {
            let mut slot = self.shared.slot.lock().await;
            // A session the remote end just closed is let go of once it has
            // published its disconnect.
            if let Slot::Active(session) = &*slot {
                if session.is_closing() {
                    session.closed().await;
                }
            }
            match &*slot {
                Slot::Idle => {}
                Slot::Active(session) if session.is_closed() => {}
                _ => {
                    return Err(LinkError::AlreadyConnected {
                        state: self.shared.context.connection_state(),
                    });
                }
            }

            let attempt = self.shared.attempts.fetch_add(1, Ordering::Relaxed);
            let connector = Connector::new(self.shared.transport.clone(), self.shared.context.clone());
            let cancel = connector.cancel_token();
            let done = CancellationToken::new();
            *slot = Slot::Connecting {
                attempt,
                cancel,
                done: done.clone(),
            };

            let shared = self.shared.clone();
            let identifier = identifier.to_string();
            tokio::spawn(async move {
                let _done = done.drop_guard();
                let result = connector.connect(&identifier).await;
                shared.install(attempt, result).await
            })
        };

        task.await
            .map_err(|e| LinkError::other(format!("connect task failed: {e}")))?
    }

    /// Tear down whatever holds the link.
    ///
    /// Cancels an in-flight connect attempt or closes the live session and
    /// waits until it is gone. Calling it with nothing to tear down is a
    /// no-op, so it is safe to call repeatedly.
    ///
    /// The teardown runs on its own task: dropping this future does not
    /// interrupt it, and the link returns to idle once it completes.
    pub async fn disconnect(&self) {
        let previous = {
            let mut slot = self.shared.slot.lock().await;
            if matches!(*slot, Slot::Idle | Slot::Closing) {
                return;
            }
            std::mem::replace(&mut *slot, Slot::Closing)
        };

        let shared = self.shared.clone();
        let teardown = tokio::spawn(async move {
            match previous {
                Slot::Connecting { cancel, done, .. } => {
                    debug!("Cancelling connect attempt");
                    cancel.cancel();
                    done.cancelled().await;
                }
                Slot::Active(session) => session.disconnect().await,
                Slot::Idle | Slot::Closing => {}
            }
            shared.release().await;
        });

        if let Err(e) = teardown.await {
            warn!("Disconnect task failed: {}", e);
            self.shared.release().await;
        }
    }

    /// Write a command to the live session.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotConnected`] if no session is live, or
    /// [`LinkError::ChannelIo`] if the write fails.
    pub async fn write(&self, command: Command) -> Result<()> {
        let session = match &*self.shared.slot.lock().await {
            Slot::Active(session) => session.clone(),
            _ => return Err(LinkError::NotConnected),
        };
        session.write(command).await
    }

    /// Toggle hold-open based on the last reported door state.
    ///
    /// Returns the command that was written.
    pub async fn toggle_hold(&self) -> Result<Command> {
        let command = self.door_state().hold_toggle();
        self.write(command).await?;
        Ok(command)
    }

    /// Toggle the lock based on the last reported door state.
    ///
    /// Returns the command that was written.
    pub async fn toggle_lock(&self) -> Result<Command> {
        let command = self.door_state().lock_toggle();
        self.write(command).await?;
        Ok(command)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.shared.context.connection_state()
    }

    /// Last state the door reported, `Unknown` without a session.
    pub fn door_state(&self) -> DoorState {
        self.shared.context.door_state()
    }

    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.shared.context.subscribe_connection()
    }

    pub fn subscribe_door(&self) -> watch::Receiver<DoorState> {
        self.shared.context.subscribe_door()
    }

    /// Cancel any pending attempt, close any session, and drop the link.
    pub async fn shutdown(self) {
        info!("Shutting down door link");
        self.disconnect().await;
    }
}

impl Shared {
    async fn release(&self) {
        let mut slot = self.slot.lock().await;
        if matches!(*slot, Slot::Closing) {
            *slot = Slot::Idle;
        }
    }

    /// Install the outcome of a connect attempt, unless the attempt was
    /// superseded by a disconnect.
    async fn install(&self, attempt: u64, result: Result<Session>) -> Result<()> {
        let mut slot = self.slot.lock().await;
        let current = matches!(&*slot, Slot::Connecting { attempt: a, .. } if *a == attempt);

        match result {
            Ok(session) if current => {
                *slot = Slot::Active(Arc::new(session));
                Ok(())
            }
            Ok(session) => {
                drop(slot);
                debug!("Connect attempt superseded; closing its session");
                session.disconnect().await;
                Err(LinkError::Cancelled)
            }
            Err(e) => {
                if current {
                    *slot = Slot::Idle;
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for DoorLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoorLink")
            .field("connection", &self.connection_state())
            .field("door", &self.door_state())
            .finish()
    }
}
