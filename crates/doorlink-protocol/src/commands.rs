//! Outbound command bytes.
//!
//! Every command is a single byte written to the channel. The door does
//! not acknowledge commands; the only feedback is the next status byte it
//! chooses to report, and there is no correlation between the two.
//!
//! # Usage Examples
//!
//! ```
//! use doorlink_protocol::{Command, encode_command};
//!
//! assert_eq!(encode_command(Command::Lock), 0x04);
//! assert_eq!(Command::from_byte(0x04).unwrap(), Command::Lock);
//! assert!(Command::from_byte(0x06).is_err());
//! ```

use doorlink_core::constants::{
    CMD_CLOSE, CMD_HOLD_OPEN, CMD_LOCK, CMD_NO_OP, CMD_TIMED_OPEN, CMD_UNLOCK,
};
use doorlink_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commands accepted by the door controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Command {
    /// Does nothing.
    NoOp = CMD_NO_OP,
    /// Open, wait, close.
    TimedOpen = CMD_TIMED_OPEN,
    /// Open and stay open.
    HoldOpen = CMD_HOLD_OPEN,
    /// Close a held-open door.
    Close = CMD_CLOSE,
    /// Engage the lock.
    Lock = CMD_LOCK,
    /// Release the lock.
    Unlock = CMD_UNLOCK,
}

impl Command {
    /// All commands in wire order.
    pub const ALL: [Command; 6] = [
        Command::NoOp,
        Command::TimedOpen,
        Command::HoldOpen,
        Command::Close,
        Command::Lock,
        Command::Unlock,
    ];

    /// Wire byte for this command.
    #[inline]
    #[must_use]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parse a command byte.
    ///
    /// The host never needs this; it exists for the remote side of the link
    /// (emulators and test doubles).
    ///
    /// # Errors
    /// Returns `Error::InvalidCommandCode` for bytes outside `0..=5`.
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            CMD_NO_OP => Ok(Command::NoOp),
            CMD_TIMED_OPEN => Ok(Command::TimedOpen),
            CMD_HOLD_OPEN => Ok(Command::HoldOpen),
            CMD_CLOSE => Ok(Command::Close),
            CMD_LOCK => Ok(Command::Lock),
            CMD_UNLOCK => Ok(Command::Unlock),
            code => Err(Error::InvalidCommandCode { code }),
        }
    }

    /// Short lower-case name, as typed in the CLI.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Command::NoOp => "noop",
            Command::TimedOpen => "open",
            Command::HoldOpen => "hold",
            Command::Close => "close",
            Command::Lock => "lock",
            Command::Unlock => "unlock",
        }
    }

    /// Parse the short name produced by [`as_str`](Command::as_str).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::NoOp => "NoOp",
            Command::TimedOpen => "TimedOpen",
            Command::HoldOpen => "HoldOpen",
            Command::Close => "Close",
            Command::Lock => "Lock",
            Command::Unlock => "Unlock",
        };
        write!(f, "{s}")
    }
}

/// Encode a command as its single wire byte. Total, never fails.
#[inline]
#[must_use]
pub fn encode_command(command: Command) -> u8 {
    command.to_byte()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(Command::NoOp, 0)]
    #[case(Command::TimedOpen, 1)]
    #[case(Command::HoldOpen, 2)]
    #[case(Command::Close, 3)]
    #[case(Command::Lock, 4)]
    #[case(Command::Unlock, 5)]
    fn test_encode_command(#[case] command: Command, #[case] byte: u8) {
        assert_eq!(encode_command(command), byte);
        assert_eq!(Command::from_byte(byte).unwrap(), command);
    }

    #[test]
    fn test_encode_is_injective() {
        let bytes: HashSet<u8> = Command::ALL.into_iter().map(encode_command).collect();
        assert_eq!(bytes.len(), Command::ALL.len());
    }

    #[test]
    fn test_from_byte_rejects_unknown() {
        for byte in 6..=u8::MAX {
            assert!(matches!(
                Command::from_byte(byte),
                Err(Error::InvalidCommandCode { code }) if code == byte
            ));
        }
    }

    #[rstest]
    #[case("open", Some(Command::TimedOpen))]
    #[case("HOLD", Some(Command::HoldOpen))]
    #[case(" close ", Some(Command::Close))]
    #[case("unlock", Some(Command::Unlock))]
    #[case("jump", None)]
    fn test_parse_short_name(#[case] input: &str, #[case] expected: Option<Command>) {
        assert_eq!(Command::parse(input), expected);
    }
}
