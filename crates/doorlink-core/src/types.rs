use crate::{Result, constants::DEVICE_ADDRESS_OCTETS, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bluetooth device address (six octets, `AA:BB:CC:DD:EE:FF`).
///
/// This is how paired door controllers are identified. Parsing accepts
/// either `:` or `-` as the octet separator and any hex digit case;
/// display is always upper-case with `:` separators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceAddress([u8; DEVICE_ADDRESS_OCTETS]);

impl DeviceAddress {
    /// Create an address from raw octets.
    #[must_use]
    pub fn new(octets: [u8; DEVICE_ADDRESS_OCTETS]) -> Self {
        DeviceAddress(octets)
    }

    /// Parse an address from its textual form.
    ///
    /// # Errors
    /// Returns `Error::InvalidDeviceAddress` if the string does not contain
    /// exactly six two-digit hex octets separated by `:` or `-`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |reason: &str| Error::InvalidDeviceAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };

        let separator = if s.contains(':') { ':' } else { '-' };
        let parts: Vec<&str> = s.split(separator).collect();
        if parts.len() != DEVICE_ADDRESS_OCTETS {
            return Err(invalid("expected six octets"));
        }

        let mut octets = [0u8; DEVICE_ADDRESS_OCTETS];
        for (slot, part) in octets.iter_mut().zip(parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid("each octet must be two hex digits"));
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| invalid("non-hex octet"))?;
        }

        Ok(DeviceAddress(octets))
    }

    /// Get the raw octets.
    #[must_use]
    pub fn octets(&self) -> [u8; DEVICE_ADDRESS_OCTETS] {
        self.0
    }

    /// Returns `true` if `s` parses as a device address.
    #[must_use]
    pub fn is_address(s: &str) -> bool {
        Self::parse(s).is_ok()
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl std::str::FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceAddress::parse(s)
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        DeviceAddress::parse(&s)
    }
}

impl From<DeviceAddress> for String {
    fn from(address: DeviceAddress) -> Self {
        address.to_string()
    }
}

/// State of the link to the door controller.
///
/// ```text
/// Idle ──> Connecting ──> Connected ──> Disconnected
///              │                             │
///              └──────> Failed               └──> Connecting (explicit reconnect)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection has been attempted yet.
    #[default]
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// A session owns an open channel.
    Connected,
    /// The last connect attempt failed or was cancelled.
    Failed,
    /// The session ended, either on request or because the channel broke.
    Disconnected,
}

impl ConnectionState {
    /// Returns `true` if a session is live.
    #[inline]
    #[must_use]
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "Idle",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Failed => "Failed",
            ConnectionState::Disconnected => "Disconnected",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("AA:BB:CC:DD:EE:FF", [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])]
    #[case("00:11:22:33:44:55", [0x00, 0x11, 0x22, 0x33, 0x44, 0x55])]
    #[case("98:d3:31:f5:a2:0c", [0x98, 0xD3, 0x31, 0xF5, 0xA2, 0x0C])]
    #[case("98-D3-31-F5-A2-0C", [0x98, 0xD3, 0x31, 0xF5, 0xA2, 0x0C])]
    #[case("  AA:BB:CC:DD:EE:FF  ", [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])]
    fn test_device_address_valid(#[case] input: &str, #[case] expected: [u8; 6]) {
        let address: DeviceAddress = input.parse().unwrap();
        assert_eq!(address.octets(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("AA:BB:CC:DD:EE")] // five octets
    #[case("AA:BB:CC:DD:EE:FF:00")] // seven octets
    #[case("AA:BB:CC:DD:EE:GG")] // non-hex
    #[case("AAA:BB:CC:DD:EE:F")] // wrong widths
    #[case("+A:BB:CC:DD:EE:FF")] // sign accepted by from_str_radix
    #[case("/dev/rfcomm0")]
    fn test_device_address_invalid(#[case] input: &str) {
        let result: Result<DeviceAddress> = input.parse();
        assert!(matches!(result, Err(Error::InvalidDeviceAddress { .. })));
        assert!(!DeviceAddress::is_address(input));
    }

    #[test]
    fn test_device_address_display_normalizes() {
        let address = DeviceAddress::parse("98-d3-31-f5-a2-0c").unwrap();
        assert_eq!(address.to_string(), "98:D3:31:F5:A2:0C");
    }

    #[test]
    fn test_device_address_serde() {
        let address = DeviceAddress::new([1, 2, 3, 4, 5, 6]);
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"01:02:03:04:05:06\"");

        let back: DeviceAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(address, back);

        let bad: std::result::Result<DeviceAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_connection_state_default_is_idle() {
        assert_eq!(ConnectionState::default(), ConnectionState::Idle);
    }

    #[rstest]
    #[case(ConnectionState::Idle, false)]
    #[case(ConnectionState::Connecting, false)]
    #[case(ConnectionState::Connected, true)]
    #[case(ConnectionState::Failed, false)]
    #[case(ConnectionState::Disconnected, false)]
    fn test_connection_state_connected(#[case] state: ConnectionState, #[case] connected: bool) {
        assert_eq!(state.is_connected(), connected);
    }

    #[test]
    fn test_connection_state_serde_snake_case() {
        let json = serde_json::to_string(&ConnectionState::Disconnected).unwrap();
        assert_eq!(json, "\"disconnected\"");
    }
}
