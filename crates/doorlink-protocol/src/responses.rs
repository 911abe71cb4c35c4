//! Inbound response bytes.
//!
//! The door reports its status with a single byte in `1..=5`. Byte `0` is
//! "no signal" and anything above `5` is treated the same way: neither is an
//! error, and neither may ever reach the state machine.

use doorlink_core::Error;
use doorlink_core::constants::{RSP_CLOSED, RSP_LOCKED, RSP_OPEN, RSP_TIMED, RSP_UNLOCKED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by the door controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ResponseCode {
    /// A timed open cycle is running.
    Timed = RSP_TIMED,
    /// Held open.
    Open = RSP_OPEN,
    /// Closed.
    Closed = RSP_CLOSED,
    /// Locked.
    Locked = RSP_LOCKED,
    /// Unlocked.
    Unlocked = RSP_UNLOCKED,
}

impl ResponseCode {
    /// All responses in wire order.
    pub const ALL: [ResponseCode; 5] = [
        ResponseCode::Timed,
        ResponseCode::Open,
        ResponseCode::Closed,
        ResponseCode::Locked,
        ResponseCode::Unlocked,
    ];

    /// Wire byte for this response.
    #[inline]
    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Decode a response byte, `None` for no-signal bytes.
    #[inline]
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            RSP_TIMED => Some(ResponseCode::Timed),
            RSP_OPEN => Some(ResponseCode::Open),
            RSP_CLOSED => Some(ResponseCode::Closed),
            RSP_LOCKED => Some(ResponseCode::Locked),
            RSP_UNLOCKED => Some(ResponseCode::Unlocked),
            _ => None,
        }
    }
}

impl TryFrom<u8> for ResponseCode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        ResponseCode::from_byte(byte).ok_or(Error::InvalidResponseCode { code: byte })
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseCode::Timed => "Timed",
            ResponseCode::Open => "Open",
            ResponseCode::Closed => "Closed",
            ResponseCode::Locked => "Locked",
            ResponseCode::Unlocked => "Unlocked",
        };
        write!(f, "{s}")
    }
}

/// Decode one inbound byte.
///
/// Returns `None` for `0` and for every byte above `5`.
///
/// ```
/// use doorlink_protocol::{ResponseCode, decode_response};
///
/// assert_eq!(decode_response(3), Some(ResponseCode::Closed));
/// assert_eq!(decode_response(0), None);
/// assert_eq!(decode_response(0xFF), None);
/// ```
#[inline]
#[must_use]
pub fn decode_response(byte: u8) -> Option<ResponseCode> {
    ResponseCode::from_byte(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, ResponseCode::Timed)]
    #[case(2, ResponseCode::Open)]
    #[case(3, ResponseCode::Closed)]
    #[case(4, ResponseCode::Locked)]
    #[case(5, ResponseCode::Unlocked)]
    fn test_decode_valid(#[case] byte: u8, #[case] expected: ResponseCode) {
        assert_eq!(decode_response(byte), Some(expected));
        assert_eq!(expected.to_byte(), byte);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(0x30)] // ASCII '0'
    #[case(0x80)]
    #[case(0xFF)]
    fn test_decode_no_signal(#[case] byte: u8) {
        assert_eq!(decode_response(byte), None);
    }

    #[test]
    fn test_try_from_reports_code() {
        let err = ResponseCode::try_from(9).unwrap_err();
        assert!(matches!(err, Error::InvalidResponseCode { code: 9 }));
        assert_eq!(ResponseCode::try_from(4).unwrap(), ResponseCode::Locked);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ResponseCode::Unlocked).unwrap();
        assert_eq!(json, "\"unlocked\"");
    }
}
