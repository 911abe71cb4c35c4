//! Enum wrapper for transport dispatch.
//!
//! `async fn` in traits is not object-safe, so `Box<dyn LinkTransport>` is
//! not an option. [`AnyTransport`] dispatches to the concrete transports
//! instead, and because the concrete futures are known the connector can
//! spawn them onto the runtime.
//!
//! # Examples
//!
//! ```
//! use doorlink_link::mock::MockTransport;
//! use doorlink_link::transports::AnyTransport;
//!
//! let (mock, _handle) = MockTransport::new();
//! let transport = AnyTransport::Mock(mock);
//! ```

use crate::mock::MockTransport;
use crate::system::SystemTransport;
use crate::traits::LinkTransport;
use crate::{BoxChannel, Endpoint, Result};

/// Any transport the link can use.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTransport {
    /// Serial ports and TCP sockets.
    System(SystemTransport),
    /// In-memory channels for development and testing.
    Mock(MockTransport),
}

impl LinkTransport for AnyTransport {
    fn resolve(&self, identifier: &str) -> Result<Endpoint> {
        match self {
            Self::System(transport) => transport.resolve(identifier),
            Self::Mock(transport) => transport.resolve(identifier),
        }
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<BoxChannel> {
        match self {
            Self::System(transport) => transport.open(endpoint).await,
            Self::Mock(transport) => transport.open(endpoint).await,
        }
    }
}

impl From<SystemTransport> for AnyTransport {
    fn from(transport: SystemTransport) -> Self {
        Self::System(transport)
    }
}

impl From<MockTransport> for AnyTransport {
    fn from(transport: MockTransport) -> Self {
        Self::Mock(transport)
    }
}
