//! Endpoints and device resolution.
//!
//! A door controller is addressed by an opaque identifier coming from the
//! front end. Resolution turns that identifier into an [`Endpoint`], the
//! concrete thing a transport knows how to open:
//!
//! 1. A paired device, looked up by Bluetooth address or by name
//! 2. A literal endpoint:
//!    - `tcp://127.0.0.1:7000` for serial-over-IP bridges and emulators
//!    - `serial:///dev/rfcomm0` or `serial:///dev/rfcomm0@38400`
//!    - a bare device path (`/dev/rfcomm0`, `COM4`)
//!
//! A well-formed Bluetooth address that is not paired does not resolve:
//! the host has no way to reach an unbound RFCOMM channel by address alone.

use doorlink_core::constants::{SERIAL_SCHEME, TCP_SCHEME};
use doorlink_core::{DeviceAddress, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// Serial port parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Device path (`/dev/rfcomm0`, `COM4`).
    pub path: String,

    /// Baud rate.
    pub baud_rate: u32,
}

impl SerialSettings {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
        }
    }
}

/// A resolved transport target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Endpoint {
    /// Serial port, typically an RFCOMM binding of the door's Bluetooth module.
    Serial(SerialSettings),

    /// TCP socket carrying the raw byte stream.
    Tcp { addr: SocketAddr },

    /// In-process endpoint served by the mock transport.
    Memory { name: String },
}

impl Endpoint {
    /// Parse a literal endpoint.
    ///
    /// Returns `Ok(None)` if `s` does not look like an endpoint at all, so
    /// the caller can try other resolution strategies.
    ///
    /// # Errors
    /// Returns `Error::InvalidEndpoint` if `s` uses an endpoint scheme but
    /// the rest of it is malformed.
    pub fn from_literal(s: &str, default_baud: u32) -> Result<Option<Self>, Error> {
        let s = s.trim();
        let invalid = |reason: &str| Error::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        if let Some(rest) = s.strip_prefix(TCP_SCHEME) {
            let addr = rest
                .parse::<SocketAddr>()
                .map_err(|_| invalid("expected tcp://<ip>:<port>"))?;
            return Ok(Some(Endpoint::Tcp { addr }));
        }

        if let Some(rest) = s.strip_prefix(SERIAL_SCHEME) {
            let (path, baud_rate) = match rest.rsplit_once('@') {
                Some((path, baud)) => {
                    let baud = baud
                        .parse::<u32>()
                        .map_err(|_| invalid("baud rate must be a number"))?;
                    (path, baud)
                }
                None => (rest, default_baud),
            };
            if path.is_empty() {
                return Err(invalid("missing device path"));
            }
            return Ok(Some(Endpoint::Serial(SerialSettings::new(path, baud_rate))));
        }

        if is_device_path(s) {
            return Ok(Some(Endpoint::Serial(SerialSettings::new(s, default_baud))));
        }

        Ok(None)
    }
}

fn is_device_path(s: &str) -> bool {
    if s.starts_with("/dev/") {
        return s.len() > "/dev/".len();
    }
    s.strip_prefix("COM")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Serial(settings) => {
                write!(f, "{SERIAL_SCHEME}{}@{}", settings.path, settings.baud_rate)
            }
            Endpoint::Tcp { addr } => write!(f, "{TCP_SCHEME}{addr}"),
            Endpoint::Memory { name } => write!(f, "memory://{name}"),
        }
    }
}

/// A door controller the host has been paired with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedDevice {
    /// User-given name ("Front Door Control").
    pub name: String,

    /// Bluetooth address of the controller's module.
    pub address: DeviceAddress,

    /// Where the host reaches it.
    pub endpoint: Endpoint,
}

impl PairedDevice {
    pub fn new(name: impl Into<String>, address: DeviceAddress, endpoint: Endpoint) -> Self {
        Self {
            name: name.into(),
            address,
            endpoint,
        }
    }
}

/// Known paired devices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRegistry {
    devices: Vec<PairedDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device, replacing any entry with the same address.
    pub fn pair(&mut self, device: PairedDevice) {
        self.devices.retain(|d| d.address != device.address);
        self.devices.push(device);
    }

    /// Find a device by address or (case-insensitive) name.
    pub fn find(&self, identifier: &str) -> Option<&PairedDevice> {
        let identifier = identifier.trim();
        if let Ok(address) = DeviceAddress::parse(identifier) {
            return self.devices.iter().find(|d| d.address == address);
        }
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(identifier))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairedDevice> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<PairedDevice> for DeviceRegistry {
    fn from_iter<I: IntoIterator<Item = PairedDevice>>(iter: I) -> Self {
        let mut registry = DeviceRegistry::new();
        for device in iter {
            registry.pair(device);
        }
        registry
    }
}
