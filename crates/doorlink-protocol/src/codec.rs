//! Tokio codec for the single-byte door protocol.
//!
//! The protocol has no framing: each byte is a whole message. `DoorCodec`
//! still goes through `tokio_util`'s [`Decoder`]/[`Encoder`] traits so the
//! session can drive the channel with `FramedRead`/`FramedWrite` like any
//! other framed transport.
//!
//! # Architecture
//!
//! ```text
//! Channel -> Decoder -> Inbound (one per byte)
//! Command -> Encoder -> Channel (one byte)
//! ```
//!
//! The decoder never fails on content. No-signal bytes come out as
//! [`Inbound::NoSignal`] so the caller can log them before discarding.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use doorlink_protocol::{Command, DoorCodec, Inbound};
//! use futures::{SinkExt, StreamExt};
//! use tokio_util::codec::Framed;
//!
//! # async fn example(stream: tokio::io::DuplexStream) -> doorlink_core::Result<()> {
//! let mut framed = Framed::new(stream, DoorCodec::new());
//! framed.send(Command::Lock).await?;
//!
//! while let Some(inbound) = framed.next().await {
//!     if let Inbound::Response(code) = inbound? {
//!         println!("door reports {code}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{Command, ResponseCode, decode_response, encode_command};
use doorlink_core::{Error, Result};

/// One decoded inbound byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// A valid status report.
    Response(ResponseCode),
    /// A byte that carries nothing (`0`, or anything above `5`).
    NoSignal(u8),
}

impl Inbound {
    /// Classify a raw byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match decode_response(byte) {
            Some(code) => Inbound::Response(code),
            None => Inbound::NoSignal(byte),
        }
    }

    /// The response, if this byte carried one.
    #[must_use]
    pub fn response(self) -> Option<ResponseCode> {
        match self {
            Inbound::Response(code) => Some(code),
            Inbound::NoSignal(_) => None,
        }
    }
}

/// Codec that decodes inbound bytes and encodes outbound commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoorCodec;

impl DoorCodec {
    /// Create a new codec.
    #[must_use]
    pub fn new() -> Self {
        DoorCodec
    }
}

impl Decoder for DoorCodec {
    type Item = Inbound;
    type Error = Error;

    /// Take exactly one byte off the front of `src`.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Decoder;
    /// use doorlink_protocol::{DoorCodec, Inbound, ResponseCode};
    ///
    /// let mut codec = DoorCodec::new();
    /// let mut buffer = BytesMut::from(&[0x00, 0x03][..]);
    ///
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Inbound::NoSignal(0)));
    /// assert_eq!(
    ///     codec.decode(&mut buffer).unwrap(),
    ///     Some(Inbound::Response(ResponseCode::Closed))
    /// );
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    /// ```
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(Some(Inbound::from_byte(src.get_u8())))
    }
}

impl Encoder<Command> for DoorCodec {
    type Error = Error;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(1);
        dst.put_u8(encode_command(item));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_needs_more() {
        let mut codec = DoorCodec::new();
        let mut buffer = BytesMut::new();
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_decode_consumes_one_byte_at_a_time() {
        let mut codec = DoorCodec::new();
        let mut buffer = BytesMut::from(&[0x02, 0x02, 0x07, 0x04][..]);

        let mut decoded = Vec::new();
        while let Some(item) = codec.decode(&mut buffer).unwrap() {
            decoded.push(item);
        }

        assert_eq!(
            decoded,
            vec![
                Inbound::Response(ResponseCode::Open),
                Inbound::Response(ResponseCode::Open),
                Inbound::NoSignal(0x07),
                Inbound::Response(ResponseCode::Locked),
            ]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_encode_appends_single_byte() {
        let mut codec = DoorCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(Command::HoldOpen, &mut buffer).unwrap();
        codec.encode(Command::Unlock, &mut buffer).unwrap();

        assert_eq!(&buffer[..], &[0x02, 0x05]);
    }

    #[test]
    fn test_inbound_response_accessor() {
        assert_eq!(
            Inbound::from_byte(5).response(),
            Some(ResponseCode::Unlocked)
        );
        assert_eq!(Inbound::from_byte(0).response(), None);
    }
}
