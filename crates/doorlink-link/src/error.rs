//! Error types for link operations.
//!
//! The taxonomy follows the life of a connection: an identifier is
//! resolved, a channel is opened, bytes flow over it, and writes need a
//! live channel. Each stage has its own variant so callers can tell a
//! typo in a device name from a dead Bluetooth module.

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors that can occur while connecting to or talking with a door.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The device identifier does not map to a reachable device.
    #[error("Cannot resolve device '{identifier}': {reason}")]
    Resolution { identifier: String, reason: String },

    /// The transport refused to open a channel.
    #[error("Failed to open channel to {endpoint}: {message}")]
    ChannelOpen { endpoint: String, message: String },

    /// Opening the channel took longer than the configured timeout.
    #[error("Connection timeout after {duration_ms}ms")]
    ConnectTimeout { duration_ms: u64 },

    /// A read or write failed on an open channel.
    #[error("Channel I/O error: {message}")]
    ChannelIo { message: String },

    /// No channel is open.
    #[error("Not connected to a door")]
    NotConnected,

    /// A connect attempt or session already holds the link.
    #[error("Link is busy ({state}); disconnect first")]
    AlreadyConnected { state: doorlink_core::ConnectionState },

    /// The connect attempt was cancelled before it finished.
    #[error("Connection attempt cancelled")]
    Cancelled,

    /// Link configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Protocol or domain error.
    #[error("Protocol error: {0}")]
    Protocol(#[from] doorlink_core::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl LinkError {
    /// Create a new resolution error.
    pub fn resolution(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create a new channel open error.
    pub fn channel_open(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelOpen {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new connect timeout error.
    pub fn connect_timeout(duration_ms: u64) -> Self {
        Self::ConnectTimeout { duration_ms }
    }

    /// Create a new channel I/O error.
    pub fn channel_io(message: impl Into<String>) -> Self {
        Self::ChannelIo {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<std::io::Error> for LinkError {
    fn from(e: std::io::Error) -> Self {
        Self::channel_io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorlink_core::ConnectionState;

    #[test]
    fn test_resolution_error() {
        let error = LinkError::resolution("Front Door", "device not paired");
        assert!(matches!(error, LinkError::Resolution { .. }));
        assert_eq!(
            error.to_string(),
            "Cannot resolve device 'Front Door': device not paired"
        );
    }

    #[test]
    fn test_channel_open_error() {
        let error = LinkError::channel_open("/dev/rfcomm0", "Permission denied");
        assert_eq!(
            error.to_string(),
            "Failed to open channel to /dev/rfcomm0: Permission denied"
        );
    }

    #[test]
    fn test_timeout_error() {
        let error = LinkError::connect_timeout(3000);
        assert_eq!(error.to_string(), "Connection timeout after 3000ms");
    }

    #[test]
    fn test_not_connected_error() {
        assert_eq!(LinkError::NotConnected.to_string(), "Not connected to a door");
    }

    #[test]
    fn test_already_connected_error() {
        let error = LinkError::AlreadyConnected {
            state: ConnectionState::Connected,
        };
        assert_eq!(
            error.to_string(),
            "Link is busy (Connected); disconnect first"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error = LinkError::from(io);
        assert!(matches!(error, LinkError::ChannelIo { .. }));
        assert_eq!(error.to_string(), "Channel I/O error: pipe closed");
    }
}
