//! Core constants for the door link protocol.
//!
//! The link carries an unframed, single-byte-per-message protocol between
//! the controlling host and the door microcontroller (usually reached through
//! an HC-05 style Bluetooth serial bridge). Every byte is a complete message:
//! there are no length prefixes, checksums, or delimiters.
//!
//! # Wire Table
//!
//! | Byte | Outbound (command) | Inbound (response) |
//! |------|--------------------|--------------------|
//! | `0`  | NoOp               | no signal (ignored) |
//! | `1`  | TimedOpen          | Timed              |
//! | `2`  | HoldOpen           | Open               |
//! | `3`  | Close              | Closed             |
//! | `4`  | Lock               | Locked             |
//! | `5`  | Unlock             | Unlocked           |
//!
//! Inbound bytes above `5` are treated as no signal as well.
//!
//! # Usage
//!
//! ```
//! use doorlink_core::constants::*;
//!
//! assert_eq!(CMD_LOCK, 0x04);
//! assert!((MIN_RESPONSE_CODE..=MAX_RESPONSE_CODE).contains(&RSP_CLOSED));
//! ```

// ============================================================================
// Command Bytes (host -> door)
// ============================================================================

/// No operation. Accepted by the door but has no effect.
pub const CMD_NO_OP: u8 = 0x00;

/// Open the door for the controller's built-in interval, then close it.
pub const CMD_TIMED_OPEN: u8 = 0x01;

/// Open the door and keep it open until a close command arrives.
pub const CMD_HOLD_OPEN: u8 = 0x02;

/// Close a held-open door.
pub const CMD_CLOSE: u8 = 0x03;

/// Engage the lock.
pub const CMD_LOCK: u8 = 0x04;

/// Release the lock.
pub const CMD_UNLOCK: u8 = 0x05;

// ============================================================================
// Response Bytes (door -> host)
// ============================================================================

/// Inbound byte the door uses for "nothing to report".
pub const RSP_NO_SIGNAL: u8 = 0x00;

/// Door is running a timed open cycle.
pub const RSP_TIMED: u8 = 0x01;

/// Door is held open.
pub const RSP_OPEN: u8 = 0x02;

/// Door is closed (and unlocked).
pub const RSP_CLOSED: u8 = 0x03;

/// Door is locked.
pub const RSP_LOCKED: u8 = 0x04;

/// Door has just been unlocked.
pub const RSP_UNLOCKED: u8 = 0x05;

/// Lowest byte value that carries a response.
pub const MIN_RESPONSE_CODE: u8 = RSP_TIMED;

/// Highest byte value that carries a response.
pub const MAX_RESPONSE_CODE: u8 = RSP_UNLOCKED;

// ============================================================================
// Addressing
// ============================================================================

/// Number of octets in a Bluetooth device address.
pub const DEVICE_ADDRESS_OCTETS: usize = 6;

/// Scheme prefix for TCP endpoints (serial-over-IP bridges, emulators).
pub const TCP_SCHEME: &str = "tcp://";

/// Scheme prefix for serial endpoints.
pub const SERIAL_SCHEME: &str = "serial://";

// ============================================================================
// Link Defaults
// ============================================================================

/// Default baud rate of HC-05 modules in data mode.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default connect timeout in milliseconds.
///
/// Bluetooth RFCOMM connects regularly take several seconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default serial read timeout in milliseconds.
///
/// Bounds how long a serial pump thread blocks before checking whether
/// the session has gone away.
pub const DEFAULT_SERIAL_POLL_MS: u64 = 100;

/// Default timeout for flushing and shutting down a channel on close.
pub const DEFAULT_CLOSE_TIMEOUT_MS: u64 = 500;

/// Capacity of the in-memory pipe sitting between a serial port and a session.
pub const SERIAL_PIPE_CAPACITY: usize = 64;
