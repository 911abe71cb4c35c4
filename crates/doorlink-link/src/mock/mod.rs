//! Mock transport for testing and development.
//!
//! The mock serves in-memory channels. Tests and demos drive the far end of
//! each channel through a [`MockRemote`], playing the part of the door
//! controller.

pub mod transport;

pub use transport::{MockChannel, MockRemote, MockTransport, MockTransportHandle};
