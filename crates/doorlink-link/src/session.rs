//! Duplex session over an open channel.
//!
//! A [`Session`] owns exactly one channel, split into a read half driven by
//! a background task and a write half guarded by a mutex.
//!
//! ```text
//!              ┌──────────────────── Session ───────────────────┐
//! write() ───► │ Mutex<FramedWrite> ──────────────────► channel │
//!              │                                                │
//!              │ read loop: FramedRead ─► DoorStateMachine ─────┼──► Notifier
//!              └────────────────────────────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! `Created -> Running -> Closed`. A session reaches `Closed` through
//! [`Session::disconnect`], the remote end closing the channel, or a read
//! error. Whichever happens first closes the channel, resets the door state
//! and emits a single [`ConnectionEvent::Disconnected`].

use crate::context::LinkContext;
use crate::notifier::{ConnectionEvent, DisconnectReason};
use crate::{BoxChannel, LinkError, Result};
use doorlink_core::ConnectionState;
use doorlink_protocol::{Command, DoorCodec, DoorState, DoorStateMachine, Inbound};
use futures::{SinkExt, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use tokio::io::{ReadHalf, WriteHalf};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

type Reader = FramedRead<ReadHalf<BoxChannel>, DoorCodec>;
type Writer = FramedWrite<WriteHalf<BoxChannel>, DoorCodec>;

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Channel handed over, read loop not started.
    Created,
    /// Read loop active.
    Running,
    /// Channel closed. Terminal.
    Closed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Running => write!(f, "Running"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

struct Inner {
    identifier: String,
    context: Arc<LinkContext>,
    reader: StdMutex<Option<Reader>>,
    writer: Mutex<Option<Writer>>,
    cancel: CancellationToken,
    finished: AtomicBool,
    phase: watch::Sender<SessionPhase>,
}

fn lock<T>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    /// Close the channel and publish the end of the session.
    ///
    /// Safe to call more than once. The first call closes the channel and
    /// emits the disconnect event; later calls wait until it has.
    async fn finish(&self, reason: DisconnectReason) {
        if self.finished.swap(true, Ordering::AcqRel) {
            let mut phase = self.phase.subscribe();
            let _ = phase.wait_for(|phase| *phase == SessionPhase::Closed).await;
            return;
        }

        drop(lock(&self.reader).take());

        // A pending write sees the cancellation and releases the lock.
        self.cancel.cancel();
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            let close_timeout = self.context.config().close_timeout;
            match tokio::time::timeout(close_timeout, writer.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("Error closing channel to {}: {}", self.identifier, e),
                Err(_) => debug!("Timed out closing channel to {}", self.identifier),
            }
        }

        self.context.set_door(DoorState::Unknown);
        self.context.set_connection(ConnectionState::Disconnected);
        info!(identifier = %self.identifier, %reason, "Session closed");
        self.context
            .notifier()
            .notify(ConnectionEvent::Disconnected { reason });

        // Last, so a closed session never has its state published after a
        // reconnect has begun.
        self.phase.send_replace(SessionPhase::Closed);
    }
}

/// Live pairing of an open channel with its read loop and write path.
///
/// Sessions are normally created by the [`Connector`](crate::Connector)
/// and held by the [`DoorLink`](crate::DoorLink) controller.
pub struct Session {
    inner: Arc<Inner>,
    read_task: StdMutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Take ownership of `channel`. The read loop does not run until
    /// [`start`](Self::start) is called.
    pub fn new(identifier: impl Into<String>, channel: BoxChannel, context: Arc<LinkContext>) -> Self {
        let (read_half, write_half) = tokio::io::split(channel);
        let (phase, _) = watch::channel(SessionPhase::Created);

        Self {
            inner: Arc::new(Inner {
                identifier: identifier.into(),
                context,
                reader: StdMutex::new(Some(FramedRead::new(read_half, DoorCodec::new()))),
                writer: Mutex::new(Some(FramedWrite::new(write_half, DoorCodec::new()))),
                cancel: CancellationToken::new(),
                finished: AtomicBool::new(false),
                phase,
            }),
            read_task: StdMutex::new(None),
        }
    }

    /// Spawn the read loop.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotConnected`] if the session is already closed,
    /// or an error if the loop is already running.
    pub fn start(&self) -> Result<()> {
        let mut task = lock(&self.read_task);
        let reader = lock(&self.inner.reader).take();
        let Some(reader) = reader else {
            return Err(match self.phase() {
                SessionPhase::Closed => LinkError::NotConnected,
                _ => LinkError::other("session read loop already started"),
            });
        };

        self.inner.phase.send_replace(SessionPhase::Running);
        *task = Some(tokio::spawn(read_loop(self.inner.clone(), reader)));
        debug!("Read loop started for {}", self.inner.identifier);
        Ok(())
    }

    /// Write one command to the channel.
    ///
    /// Fire-and-forget: no acknowledgement is awaited. Concurrent writers
    /// are serialized. A failed write does not stop the read loop.
    ///
    /// A write stalled on a full channel is abandoned when the session
    /// closes.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotConnected`] once the session is closing or
    /// closed, or [`LinkError::ChannelIo`] if the write fails.
    pub async fn write(&self, command: Command) -> Result<()> {
        let mut writer = self.inner.writer.lock().await;
        let Some(sink) = writer.as_mut() else {
            return Err(LinkError::NotConnected);
        };

        let sent = tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => {
                debug!("Write of {} to {} abandoned, session closing", command, self.inner.identifier);
                return Err(LinkError::NotConnected);
            }
            sent = sink.send(command) => sent,
        };
        sent.map_err(|e| {
            warn!("Write of {} to {} failed: {}", command, self.inner.identifier, e);
            LinkError::channel_io(e.to_string())
        })?;

        debug!(%command, identifier = %self.inner.identifier, "Command written");
        Ok(())
    }

    /// Close the channel and wait for the read loop to finish.
    ///
    /// Idempotent. The disconnect event is emitted once per session no
    /// matter how many times this is called.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let task = lock(&self.read_task).take();
        match task {
            Some(task) => {
                if let Err(e) = task.await {
                    warn!("Read loop for {} ended abnormally: {}", self.inner.identifier, e);
                    self.inner.finish(DisconnectReason::Requested).await;
                }
            }
            None => self.inner.finish(DisconnectReason::Requested).await,
        }
    }

    /// Wait until the session is closed, whatever the cause.
    pub async fn closed(&self) {
        let mut phase = self.inner.phase.subscribe();
        let _ = phase.wait_for(|phase| *phase == SessionPhase::Closed).await;
    }

    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.phase() == SessionPhase::Closed
    }

    /// Returns `true` once the session has started closing.
    pub(crate) fn is_closing(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }

    /// Identifier this session was connected with.
    pub fn identifier(&self) -> &str {
        &self.inner.identifier
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identifier", &self.inner.identifier)
            .field("phase", &self.phase())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // The read loop holds its own reference; cancelling lets it close
        // the channel and report the disconnect.
        self.inner.cancel.cancel();
    }
}

async fn read_loop(inner: Arc<Inner>, mut reader: Reader) {
    let mut machine = DoorStateMachine::new();

    let reason = loop {
        tokio::select! {
            biased;

            () = inner.cancel.cancelled() => break DisconnectReason::Requested,

            frame = reader.next() => match frame {
                Some(Ok(Inbound::Response(code))) => match machine.observe(code) {
                    Some(state) => {
                        debug!(%state, identifier = %inner.identifier, "Door state changed");
                        inner.context.set_door(state);
                        inner.context.notifier().state(state);
                    }
                    None => trace!("Duplicate response {}", code),
                },
                Some(Ok(Inbound::NoSignal(byte))) => {
                    trace!("Ignoring no-signal byte {:#04x}", byte);
                }
                Some(Err(e)) => {
                    warn!("Read from {} failed: {}", inner.identifier, e);
                    break DisconnectReason::IoError(e.to_string());
                }
                None => {
                    info!("Channel to {} closed by remote", inner.identifier);
                    break DisconnectReason::RemoteClosed;
                }
            },
        }
    };

    debug!(
        identifier = %inner.identifier,
        changes = machine.change_count(),
        duplicates = machine.duplicate_count(),
        "Read loop stopped"
    );
    machine.reset();
    drop(reader);
    inner.finish(reason).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{LinkEvent, LinkEvents, Notifier};
    use crate::LinkConfig;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    fn session() -> (Session, DuplexStream, LinkEvents, Arc<LinkContext>) {
        let (notifier, events) = Notifier::channel();
        let context = Arc::new(LinkContext::new(LinkConfig::default(), notifier));
        let (local, remote) = tokio::io::duplex(16);
        let session = Session::new("door", Box::new(local), context.clone());
        (session, remote, events, context)
    }

    #[tokio::test]
    async fn test_responses_become_state_events() {
        let (session, mut remote, mut events, context) = session();
        session.start().unwrap();
        assert_eq!(session.phase(), SessionPhase::Running);

        remote.write_all(&[2, 2, 0, 9, 3]).await.unwrap();

        assert_eq!(events.recv().await, Some(LinkEvent::State(DoorState::Open)));
        assert_eq!(events.recv().await, Some(LinkEvent::State(DoorState::Closed)));
        assert_eq!(context.door_state(), DoorState::Closed);

        session.disconnect().await;
        assert!(matches!(
            events.recv().await,
            Some(LinkEvent::Connection(ConnectionEvent::Disconnected {
                reason: DisconnectReason::Requested
            }))
        ));
    }

    #[tokio::test]
    async fn test_write_reaches_remote() {
        let (session, mut remote, _events, _context) = session();
        session.start().unwrap();

        session.write(Command::HoldOpen).await.unwrap();
        session.write(Command::Close).await.unwrap();

        let mut buf = [0u8; 2];
        remote.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [2, 3]);
    }

    #[tokio::test]
    async fn test_remote_close_ends_session() {
        let (session, remote, mut events, context) = session();
        session.start().unwrap();
        drop(remote);

        session.closed().await;
        assert!(session.is_closed());
        assert_eq!(context.connection_state(), ConnectionState::Disconnected);
        assert!(matches!(
            events.recv().await,
            Some(LinkEvent::Connection(ConnectionEvent::Disconnected {
                reason: DisconnectReason::RemoteClosed
            }))
        ));
        assert!(matches!(
            session.write(Command::Lock).await,
            Err(LinkError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (session, _remote, mut events, context) = session();
        session.start().unwrap();

        session.disconnect().await;
        assert_eq!(context.connection_state(), ConnectionState::Disconnected);
        session.disconnect().await;
        assert_eq!(context.connection_state(), ConnectionState::Disconnected);

        assert!(matches!(
            events.recv().await,
            Some(LinkEvent::Connection(ConnectionEvent::Disconnected { .. }))
        ));
        assert_eq!(events.try_recv(), None);
    }

    #[tokio::test]
    async fn test_disconnect_before_start() {
        let (session, mut remote, mut events, _context) = session();

        session.disconnect().await;
        assert!(session.is_closed());
        assert!(matches!(session.start(), Err(LinkError::NotConnected)));
        assert!(matches!(
            events.recv().await,
            Some(LinkEvent::Connection(ConnectionEvent::Disconnected { .. }))
        ));

        let mut buf = [0u8; 1];
        assert_eq!(remote.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (session, _remote, _events, _context) = session();
        session.start().unwrap();
        assert!(matches!(session.start(), Err(LinkError::Other(_))));
        session.disconnect().await;
    }
}
