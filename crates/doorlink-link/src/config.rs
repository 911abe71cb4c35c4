//! Link configuration.

use doorlink_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_CLOSE_TIMEOUT_MS, DEFAULT_CONNECT_TIMEOUT_MS,
    DEFAULT_SERIAL_POLL_MS,
};
use crate::{LinkError, Result};
use std::time::Duration;

/// Configuration shared by the connector and the sessions it creates.
///
/// # Example
///
/// ```
/// use doorlink_link::LinkConfig;
/// use std::time::Duration;
///
/// let config = LinkConfig::default()
///     .connect_timeout(Duration::from_secs(5))
///     .baud_rate(38_400);
///
/// assert_eq!(config.baud_rate, 38_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Upper bound on resolving and opening a channel.
    pub connect_timeout: Duration,

    /// Baud rate used for serial endpoints that do not name their own.
    pub baud_rate: u32,

    /// Read timeout of the serial pump threads.
    pub serial_poll_interval: Duration,

    /// Timeout for flushing and shutting down a channel on close.
    pub close_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            baud_rate: DEFAULT_BAUD_RATE,
            serial_poll_interval: Duration::from_millis(DEFAULT_SERIAL_POLL_MS),
            close_timeout: Duration::from_millis(DEFAULT_CLOSE_TIMEOUT_MS),
        }
    }
}

impl LinkConfig {
    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the default serial baud rate
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the serial poll interval
    pub fn serial_poll_interval(mut self, interval: Duration) -> Self {
        self.serial_poll_interval = interval;
        self
    }

    /// Set the close timeout
    pub fn close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Check that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Configuration`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(LinkError::configuration("connect timeout must be non-zero"));
        }
        if self.baud_rate == 0 {
            return Err(LinkError::configuration("baud rate must be non-zero"));
        }
        if self.serial_poll_interval.is_zero() {
            return Err(LinkError::configuration("serial poll interval must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LinkConfig::default();
        assert_eq!(config.connect_timeout.as_millis(), 10_000);
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.serial_poll_interval.as_millis(), 100);
        assert_eq!(config.close_timeout.as_millis(), 500);
    }

    #[test]
    fn test_config_builder() {
        let config = LinkConfig::default()
            .connect_timeout(Duration::from_millis(250))
            .serial_poll_interval(Duration::from_millis(20))
            .close_timeout(Duration::from_millis(50));

        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.serial_poll_interval, Duration::from_millis(20));
        assert_eq!(config.close_timeout, Duration::from_millis(50));
    }

    #[test]
    fn test_config_validate() {
        assert!(LinkConfig::default().validate().is_ok());

        let zero_baud = LinkConfig::default().baud_rate(0);
        assert!(matches!(
            zero_baud.validate(),
            Err(LinkError::Configuration { .. })
        ));

        let zero_timeout = LinkConfig::default().connect_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());
    }
}
