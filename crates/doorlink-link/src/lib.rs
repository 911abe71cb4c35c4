//! Link layer between a host and a door controller.
//!
//! This crate turns a device identifier into a live, bidirectional session
//! with the door: it resolves the identifier, opens a byte channel, runs a
//! read loop that derives the door state from the controller's responses,
//! and writes commands back.
//!
//! # Components
//!
//! - **[`DoorLink`]**: lifecycle controller, the type a front end holds
//! - **[`Connector`]**: one-shot resolve-and-open of a channel
//! - **[`Session`]**: owns the channel, its read loop, and its write path
//! - **[`Notifier`] / [`LinkEvents`]**: ordered, non-blocking event delivery
//! - **Transports**: [`SystemTransport`] (serial ports, TCP bridges) and
//!   [`MockTransport`](mock::MockTransport) (in-memory, for tests)
//!
//! # Example
//!
//! ```no_run
//! use doorlink_link::{ConnectionEvent, DoorLink, LinkConfig, LinkEvent, SystemTransport};
//! use doorlink_protocol::Command;
//!
//! # async fn example() -> doorlink_link::Result<()> {
//! let (link, mut events) = DoorLink::new(SystemTransport::default(), LinkConfig::default());
//! link.connect("/dev/rfcomm0").await?;
//! link.write(Command::TimedOpen).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         LinkEvent::State(state) => println!("door: {state}"),
//!         LinkEvent::Connection(ConnectionEvent::Disconnected { reason }) => {
//!             println!("lost link: {reason}");
//!             break;
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod config;
pub mod connector;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod link;
pub mod mock;
pub mod notifier;
#[cfg(feature = "serial")]
mod serial;
pub mod session;
pub mod system;
pub mod traits;
pub mod transports;

pub use channel::{BoxChannel, Channel};
pub use config::LinkConfig;
pub use connector::Connector;
pub use context::LinkContext;
pub use endpoint::{DeviceRegistry, Endpoint, PairedDevice, SerialSettings};
pub use error::{LinkError, Result};
pub use link::DoorLink;
pub use notifier::{ConnectionEvent, DisconnectReason, LinkEvent, LinkEvents, Notifier};
pub use session::{Session, SessionPhase};
pub use system::SystemTransport;
pub use traits::LinkTransport;
pub use transports::AnyTransport;
