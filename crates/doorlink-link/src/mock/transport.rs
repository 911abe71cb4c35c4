//! In-memory transport with a controllable far end.

use crate::traits::LinkTransport;
use crate::{BoxChannel, Endpoint, LinkError, Result};
use doorlink_core::DeviceAddress;
use doorlink_protocol::{Command, ResponseCode};
use std::collections::{HashSet, VecDeque};
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio::sync::mpsc;
use tracing::debug;

const PIPE_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Controls {
    devices: HashSet<String>,
    failures: VecDeque<String>,
    open_delay: Option<Duration>,
}

#[derive(Debug)]
struct Shared {
    controls: Mutex<Controls>,
    opens: AtomicUsize,
    live: Arc<AtomicUsize>,
    remotes: mpsc::UnboundedSender<MockRemote>,
}

impl Shared {
    fn controls(&self) -> MutexGuard<'_, Controls> {
        self.controls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Transport that serves in-memory channels to named devices.
///
/// # Examples
///
/// ```
/// use doorlink_link::LinkTransport;
/// use doorlink_link::mock::MockTransport;
/// use doorlink_protocol::{Command, ResponseCode};
///
/// #[tokio::main]
/// async fn main() -> doorlink_link::Result<()> {
///     let (transport, mut handle) = MockTransport::new();
///     handle.add_device("Front Door");
///
///     let endpoint = transport.resolve("Front Door")?;
///     let _channel = transport.open(&endpoint).await?;
///
///     let mut door = handle.accept().await.unwrap();
///     door.send_response(ResponseCode::Closed).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockTransport {
    shared: Arc<Shared>,
}

impl MockTransport {
    /// Create a transport and the handle that controls it.
    pub fn new() -> (Self, MockTransportHandle) {
        let (remotes_tx, remotes_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            controls: Mutex::new(Controls::default()),
            opens: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            remotes: remotes_tx,
        });

        let transport = Self {
            shared: shared.clone(),
        };
        let handle = MockTransportHandle {
            shared,
            remotes: remotes_rx,
        };
        (transport, handle)
    }
}

impl LinkTransport for MockTransport {
    fn resolve(&self, identifier: &str) -> Result<Endpoint> {
        let identifier = identifier.trim();
        if self.shared.controls().devices.contains(identifier) {
            return Ok(Endpoint::Memory {
                name: identifier.to_string(),
            });
        }
        if DeviceAddress::is_address(identifier) {
            return Err(LinkError::resolution(identifier, "device not paired"));
        }
        Err(LinkError::resolution(identifier, "unrecognised identifier"))
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<BoxChannel> {
        let Endpoint::Memory { name } = endpoint else {
            return Err(LinkError::channel_open(
                endpoint.to_string(),
                "mock transport only serves memory endpoints",
            ));
        };

        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        let delay = self.shared.controls().open_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.shared.controls().failures.pop_front();
        if let Some(message) = failure {
            debug!("Mock open of {} failing: {}", name, message);
            return Err(LinkError::channel_open(endpoint.to_string(), message));
        }
        let known = self.shared.controls().devices.contains(name);
        if !known {
            return Err(LinkError::channel_open(endpoint.to_string(), "no such device"));
        }

        let (local, remote) = tokio::io::duplex(PIPE_CAPACITY);
        let fault = Arc::new(AtomicBool::new(false));
        let write_fault = Arc::new(AtomicBool::new(false));
        self.shared.live.fetch_add(1, Ordering::SeqCst);

        let channel = MockChannel {
            inner: local,
            fault: fault.clone(),
            write_fault: write_fault.clone(),
            _live: LiveGuard(self.shared.live.clone()),
        };
        let remote = MockRemote {
            name: name.clone(),
            stream: remote,
            fault,
            write_fault,
        };
        // Nobody accepting is fine; the remote end then just closes.
        let _ = self.shared.remotes.send(remote);

        debug!("Mock channel open to {}", name);
        Ok(Box::new(channel))
    }
}

/// Handle for controlling a [`MockTransport`].
#[derive(Debug)]
pub struct MockTransportHandle {
    shared: Arc<Shared>,
    remotes: mpsc::UnboundedReceiver<MockRemote>,
}

impl MockTransportHandle {
    /// Make `identifier` resolvable and openable.
    pub fn add_device(&self, identifier: impl Into<String>) {
        self.shared.controls().devices.insert(identifier.into());
    }

    /// Make the next open fail with `message`.
    pub fn fail_next_open(&self, message: impl Into<String>) {
        self.shared.controls().failures.push_back(message.into());
    }

    /// Delay every subsequent open by `delay`.
    pub fn set_open_delay(&self, delay: Option<Duration>) {
        self.shared.controls().open_delay = delay;
    }

    /// Wait for the next opened channel and take its far end.
    ///
    /// Returns `None` once the transport is dropped and no channel is pending.
    pub async fn accept(&mut self) -> Option<MockRemote> {
        self.remotes.recv().await
    }

    /// Number of open attempts so far, including failed and cancelled ones.
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Number of local channel ends still alive.
    pub fn live_channels(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Local end of a mock channel.
///
/// Behaves like the underlying duplex pipe until a fault is injected from
/// the far end, after which every read and write fails with
/// `ConnectionReset`. A write-only fault fails writes with `BrokenPipe` and
/// leaves reads alone.
#[derive(Debug)]
pub struct MockChannel {
    inner: DuplexStream,
    fault: Arc<AtomicBool>,
    write_fault: Arc<AtomicBool>,
    _live: LiveGuard,
}

impl MockChannel {
    fn faulted(&self) -> bool {
        self.fault.load(Ordering::Acquire)
    }
}

fn injected_fault() -> io::Error {
    io::Error::new(io::ErrorKind::ConnectionReset, "injected fault")
}

impl AsyncRead for MockChannel {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.faulted() {
            return Poll::Ready(Err(injected_fault()));
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockChannel {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.faulted() {
            return Poll::Ready(Err(injected_fault()));
        }
        if self.write_fault.load(Ordering::Acquire) {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "injected write fault")));
        }
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Far end of a mock channel: the simulated door controller.
#[derive(Debug)]
pub struct MockRemote {
    name: String,
    stream: DuplexStream,
    fault: Arc<AtomicBool>,
    write_fault: Arc<AtomicBool>,
}

impl MockRemote {
    /// Device the channel was opened to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Report a door state.
    pub async fn send_response(&mut self, code: ResponseCode) -> Result<()> {
        self.send_byte(code.to_byte()).await
    }

    /// Send a raw byte, valid or not.
    pub async fn send_byte(&mut self, byte: u8) -> Result<()> {
        self.send_bytes(&[byte]).await
    }

    /// Send raw bytes in one write.
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await?;
        Ok(())
    }

    /// Read the next raw byte the host wrote.
    ///
    /// Returns `None` once the host closed its end.
    pub async fn recv_byte(&mut self) -> Option<u8> {
        self.stream.read_u8().await.ok()
    }

    /// Read the next command the host wrote.
    ///
    /// Returns `None` once the host closed its end or if the byte is not a
    /// valid command code.
    pub async fn recv_command(&mut self) -> Option<Command> {
        let byte = self.recv_byte().await?;
        Command::from_byte(byte).ok()
    }

    /// Break the channel: the host's next read or write fails.
    pub async fn inject_fault(&mut self) {
        self.fault.store(true, Ordering::Release);
        // Wake a reader parked on the pipe so it observes the fault.
        let _ = self.stream.write_all(&[0]).await;
    }

    /// Fail the host's writes from now on. Its reads keep working.
    pub fn fail_writes(&self) {
        self.write_fault.store(true, Ordering::Release);
    }

    /// Close the far end, as if the controller went out of range.
    pub fn hang_up(self) {
        drop(self);
    }
}
