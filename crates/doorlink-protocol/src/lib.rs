//! Byte protocol spoken between the host and the door controller.
//!
//! - [`Command`]: outbound instruction bytes, see [`encode_command`]
//! - [`ResponseCode`]: inbound status bytes, see [`decode_response`]
//! - [`DoorState`]: what the host believes the door is doing
//! - [`DoorStateMachine`]: turns a stream of responses into state changes
//! - [`DoorCodec`]: `tokio_util` codec for framing the byte stream

pub mod codec;
pub mod commands;
pub mod responses;
pub mod state;
pub mod state_machine;

pub use codec::{DoorCodec, Inbound};
pub use commands::{Command, encode_command};
pub use responses::{ResponseCode, decode_response};
pub use state::DoorState;
pub use state_machine::DoorStateMachine;
