//! Serial port channels.
//!
//! `serialport` is blocking, so each open port is serviced by two pump
//! threads that shuttle bytes between the port and one end of an in-memory
//! duplex pipe. The session owns the other end and sees an ordinary async
//! stream.
//!
//! ```text
//! Session <─> DuplexStream <─> [rx pump] <── port
//!                              [tx pump] ──> port
//! ```
//!
//! Dropping the session's end closes the pipe. The tx pump sees EOF and
//! raises the shared `closed` flag; the rx pump notices it on its next
//! read timeout. Once both threads have exited the port handle is released.

use crate::{BoxChannel, LinkError, Result, SerialSettings};
use doorlink_core::constants::SERIAL_PIPE_CAPACITY;
use serialport::{DataBits, FlowControl, Parity, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::io::{DuplexStream, duplex, split};
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

/// Open a serial port and wrap it as an async channel.
pub(crate) async fn open(settings: &SerialSettings, poll_interval: Duration) -> Result<BoxChannel> {
    let endpoint = format!("{}@{}", settings.path, settings.baud_rate);
    debug!("Opening serial port {}", endpoint);

    let builder = serialport::new(settings.path.clone(), settings.baud_rate)
        .timeout(poll_interval)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None);

    let port = tokio::task::spawn_blocking(move || builder.open())
        .await
        .map_err(|e| LinkError::other(format!("serial open task failed: {e}")))?
        .map_err(|e| LinkError::channel_open(endpoint.clone(), e.to_string()))?;

    let writer = port
        .try_clone()
        .map_err(|e| LinkError::channel_open(endpoint.clone(), e.to_string()))?;

    let (local, remote) = duplex(SERIAL_PIPE_CAPACITY);
    let (remote_rd, remote_wr) = split(remote);
    let closed = Arc::new(AtomicBool::new(false));
    let handle = Handle::current();

    spawn_pump(format!("serial-rx {}", settings.path), {
        let closed = closed.clone();
        let handle = handle.clone();
        move || rx_pump(port, remote_wr, closed, handle)
    })?;
    let stop_rx = closed.clone();
    if let Err(e) = spawn_pump(format!("serial-tx {}", settings.path), move || {
        tx_pump(writer, remote_rd, closed, handle)
    }) {
        stop_rx.store(true, Ordering::Release);
        return Err(e);
    }

    info!("Serial port {} open", endpoint);
    Ok(Box::new(local))
}

fn spawn_pump<F>(name: String, f: F) -> Result<()>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(f)
        .map(|_| ())
        .map_err(|e| LinkError::other(format!("failed to spawn serial pump: {e}")))
}

/// Port -> pipe.
fn rx_pump<R: Read>(
    mut port: R,
    mut pipe: WriteHalf<DuplexStream>,
    closed: Arc<AtomicBool>,
    handle: Handle,
) {
    let mut buf = [0u8; SERIAL_PIPE_CAPACITY];
    loop {
        match port.read(&mut buf) {
            Ok(0) => {
                debug!("Serial port reported EOF");
                break;
            }
            Ok(n) => {
                trace!("Serial rx {} bytes", n);
                if handle.block_on(pipe.write_all(&buf[..n])).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                if closed.load(Ordering::Acquire) {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("Serial read failed: {}", e);
                break;
            }
        }
    }
    closed.store(true, Ordering::Release);
    let _ = handle.block_on(pipe.shutdown());
}

/// Pipe -> port.
fn tx_pump<W: Write>(
    mut port: W,
    mut pipe: ReadHalf<DuplexStream>,
    closed: Arc<AtomicBool>,
    handle: Handle,
) {
    let mut buf = [0u8; SERIAL_PIPE_CAPACITY];
    loop {
        let n = match handle.block_on(pipe.read(&mut buf)) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        trace!("Serial tx {} bytes", n);
        if let Err(e) = port.write_all(&buf[..n]).and_then(|()| port.flush()) {
            warn!("Serial write failed: {}", e);
            break;
        }
    }
    closed.store(true, Ordering::Release);
}
