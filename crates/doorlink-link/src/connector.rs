//! One-shot connection establishment.
//!
//! A [`Connector`] resolves a device identifier, opens a channel within the
//! configured timeout, and hands the channel to a new [`Session`]. It
//! reports the outcome once through the notifier and is consumed by the
//! attempt: retrying means building a new connector.
//!
//! # Example
//!
//! ```no_run
//! use doorlink_link::{Connector, LinkConfig, LinkContext, Notifier, SystemTransport};
//! use std::sync::Arc;
//!
//! # async fn example() -> doorlink_link::Result<()> {
//! let (notifier, mut events) = Notifier::channel();
//! let context = Arc::new(LinkContext::new(LinkConfig::default(), notifier));
//! let transport = Arc::new(SystemTransport::default().into());
//!
//! let session = Connector::new(transport, context).connect("/dev/rfcomm0").await?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! session.disconnect().await;
//! # Ok(())
//! # }
//! ```

use crate::context::LinkContext;
use crate::notifier::ConnectionEvent;
use crate::traits::LinkTransport;
use crate::transports::AnyTransport;
use crate::{BoxChannel, LinkError, Result, Session};
use doorlink_core::ConnectionState;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Establishes a single connection.
#[derive(Debug)]
pub struct Connector {
    transport: Arc<AnyTransport>,
    context: Arc<LinkContext>,
    cancel: CancellationToken,
}

impl Connector {
    pub fn new(transport: Arc<AnyTransport>, context: Arc<LinkContext>) -> Self {
        Self {
            transport,
            context,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that aborts this attempt when cancelled.
    ///
    /// Cancelling releases any partially opened channel and leaves the
    /// connection state at `Failed`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolve `identifier`, open a channel, and start a session on it.
    ///
    /// Emits [`ConnectionEvent::Succeeded`] before the session's read loop
    /// starts, so it always precedes the session's state events. On any
    /// failure emits [`ConnectionEvent::Failed`] and returns the error.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Resolution`] if the identifier cannot be resolved
    /// - [`LinkError::ChannelOpen`] if the transport cannot open a channel
    /// - [`LinkError::ConnectTimeout`] if opening exceeds the timeout
    /// - [`LinkError::Cancelled`] if the attempt was cancelled
    pub async fn connect(self, identifier: &str) -> Result<Session> {
        let identifier = identifier.trim();
        self.context.set_connection(ConnectionState::Connecting);
        info!("Connecting to {}", identifier);

        let opened = tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LinkError::Cancelled),
            opened = self.establish(identifier) => opened,
        };

        let channel = match opened {
            Ok(channel) if self.cancel.is_cancelled() => {
                drop(channel);
                return self.fail(identifier, LinkError::Cancelled);
            }
            Ok(channel) => channel,
            Err(e) => return self.fail(identifier, e),
        };

        let session = Session::new(identifier, channel, self.context.clone());
        self.context.set_connection(ConnectionState::Connected);
        info!("Connected to {}", identifier);
        self.context.notifier().notify(ConnectionEvent::Succeeded {
            identifier: identifier.to_string(),
        });

        session.start()?;
        Ok(session)
    }

    async fn establish(&self, identifier: &str) -> Result<BoxChannel> {
        let endpoint = self.transport.resolve(identifier)?;
        debug!("Opening channel to {}", endpoint);

        let limit = self.context.config().connect_timeout;
        match tokio::time::timeout(limit, self.transport.open(&endpoint)).await {
            Ok(opened) => opened,
            Err(_) => Err(LinkError::connect_timeout(limit.as_millis() as u64)),
        }
    }

    fn fail(&self, identifier: &str, error: LinkError) -> Result<Session> {
        warn!("Connection to {} failed: {}", identifier, error);
        self.context.set_connection(ConnectionState::Failed);
        self.context.notifier().notify(ConnectionEvent::Failed {
            identifier: identifier.to_string(),
            reason: error.to_string(),
        });
        Err(error)
    }
}
