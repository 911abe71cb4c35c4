//! Transport trait definition.
//!
//! A transport performs the two halves of establishing a link: mapping a
//! device identifier to an [`Endpoint`] and opening a [`BoxChannel`] to it.
//!
//! The trait uses native `async fn` (Edition 2024), which is not object-safe.
//! Concrete dispatch goes through [`AnyTransport`](crate::transports::AnyTransport).

#![allow(async_fn_in_trait)]

use crate::{BoxChannel, Endpoint, Result};

/// Resolves identifiers and opens channels.
///
/// # Example
///
/// ```no_run
/// use doorlink_link::{LinkTransport, Result};
///
/// async fn probe<T: LinkTransport>(transport: &T, id: &str) -> Result<()> {
///     let endpoint = transport.resolve(id)?;
///     let _channel = transport.open(&endpoint).await?;
///     Ok(())
/// }
/// ```
pub trait LinkTransport: Send + Sync {
    /// Map a device identifier to a concrete endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Resolution`](crate::LinkError::Resolution) if
    /// the identifier is unknown or malformed.
    fn resolve(&self, identifier: &str) -> Result<Endpoint>;

    /// Open a duplex channel to a resolved endpoint.
    ///
    /// Dropping the returned future before it completes must not leave a
    /// handle open.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::ChannelOpen`](crate::LinkError::ChannelOpen) if
    /// the transport cannot reach the endpoint.
    async fn open(&self, endpoint: &Endpoint) -> Result<BoxChannel>;
}
