//! The duplex byte channel handed from a transport to a session.

use tokio::io::{AsyncRead, AsyncWrite};

/// Anything a session can read response bytes from and write command bytes to.
///
/// Blanket-implemented for every `Send + Unpin` async byte stream, so TCP
/// streams, serial pipes, and in-memory duplex pipes all qualify.
pub trait Channel: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Channel for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

/// Owned, type-erased channel.
pub type BoxChannel = Box<dyn Channel>;
