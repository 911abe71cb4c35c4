//! Transport over real serial ports and TCP sockets.

use crate::traits::LinkTransport;
use crate::{BoxChannel, DeviceRegistry, Endpoint, LinkConfig, LinkError, Result};
use doorlink_core::DeviceAddress;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Transport that reaches doors through the host's serial ports (RFCOMM
/// bindings included) or through TCP serial bridges.
///
/// Identifiers are resolved against the paired-device registry first,
/// then parsed as literal endpoints.
///
/// # Example
///
/// ```no_run
/// use doorlink_link::{DeviceRegistry, LinkConfig, LinkTransport, SystemTransport};
///
/// # async fn example() -> doorlink_link::Result<()> {
/// let transport = SystemTransport::new(DeviceRegistry::new(), LinkConfig::default());
/// let endpoint = transport.resolve("tcp://127.0.0.1:7000")?;
/// let _channel = transport.open(&endpoint).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemTransport {
    registry: DeviceRegistry,
    config: LinkConfig,
}

impl SystemTransport {
    pub fn new(registry: DeviceRegistry, config: LinkConfig) -> Self {
        Self { registry, config }
    }

    /// Paired devices known to this transport.
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    async fn open_tcp(&self, endpoint: &Endpoint, addr: std::net::SocketAddr) -> Result<BoxChannel> {
        debug!("Opening TCP channel to {}", addr);

        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| LinkError::channel_open(endpoint.to_string(), e.to_string()))?;

        // Commands are single bytes; Nagle would hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }

        info!("TCP channel open to {}", addr);
        Ok(Box::new(stream))
    }
}

impl LinkTransport for SystemTransport {
    fn resolve(&self, identifier: &str) -> Result<Endpoint> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LinkError::resolution(identifier, "empty identifier"));
        }

        if let Some(device) = self.registry.find(identifier) {
            debug!(
                "Resolved '{}' to paired device {} ({})",
                identifier, device.name, device.endpoint
            );
            return Ok(device.endpoint.clone());
        }

        match Endpoint::from_literal(identifier, self.config.baud_rate) {
            Ok(Some(endpoint)) => {
                debug!("Resolved '{}' as literal endpoint {}", identifier, endpoint);
                Ok(endpoint)
            }
            Ok(None) if DeviceAddress::is_address(identifier) => {
                Err(LinkError::resolution(identifier, "device not paired"))
            }
            Ok(None) => Err(LinkError::resolution(identifier, "unrecognised identifier")),
            Err(e) => Err(LinkError::resolution(identifier, e.to_string())),
        }
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<BoxChannel> {
        match endpoint {
            Endpoint::Tcp { addr } => self.open_tcp(endpoint, *addr).await,
            #[cfg(feature = "serial")]
            Endpoint::Serial(settings) => {
                crate::serial::open(settings, self.config.serial_poll_interval).await
            }
            #[cfg(not(feature = "serial"))]
            Endpoint::Serial(_) => Err(LinkError::channel_open(
                endpoint.to_string(),
                "serial support not compiled in",
            )),
            Endpoint::Memory { .. } => Err(LinkError::channel_open(
                endpoint.to_string(),
                "memory endpoints are only served by the mock transport",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PairedDevice, SerialSettings};

    fn transport() -> SystemTransport {
        let registry: DeviceRegistry = [PairedDevice::new(
            "Front Door",
            DeviceAddress::parse("98:D3:31:F5:A2:0C").unwrap(),
            Endpoint::Serial(SerialSettings::new("/dev/rfcomm0", 9600)),
        )]
        .into_iter()
        .collect();
        SystemTransport::new(registry, LinkConfig::default().baud_rate(38_400))
    }

    #[test]
    fn test_resolve_paired_by_name_and_address() {
        let transport = transport();
        let expected = Endpoint::Serial(SerialSettings::new("/dev/rfcomm0", 9600));

        assert_eq!(transport.resolve("Front Door").unwrap(), expected);
        assert_eq!(transport.resolve("98:d3:31:f5:a2:0c").unwrap(), expected);
    }

    #[test]
    fn test_resolve_literal_uses_configured_baud() {
        let endpoint = transport().resolve("/dev/rfcomm3").unwrap();
        assert_eq!(
            endpoint,
            Endpoint::Serial(SerialSettings::new("/dev/rfcomm3", 38_400))
        );
    }

    #[test]
    fn test_resolve_unpaired_address() {
        let err = transport().resolve("AA:BB:CC:DD:EE:FF").unwrap_err();
        assert!(matches!(err, LinkError::Resolution { ref reason, .. } if reason == "device not paired"));
    }

    #[test]
    fn test_resolve_unknown_and_malformed() {
        let transport = transport();
        assert!(matches!(
            transport.resolve("Back Door"),
            Err(LinkError::Resolution { .. })
        ));
        assert!(matches!(
            transport.resolve("tcp://nowhere"),
            Err(LinkError::Resolution { .. })
        ));
        assert!(matches!(
            transport.resolve("   "),
            Err(LinkError::Resolution { .. })
        ));
    }

    #[tokio::test]
    async fn test_open_memory_endpoint_is_refused() {
        let endpoint = Endpoint::Memory {
            name: "bench".to_string(),
        };
        let result = transport().open(&endpoint).await;
        assert!(matches!(result, Err(LinkError::ChannelOpen { .. })));
    }

    #[tokio::test]
    async fn test_open_tcp_refused() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = transport().open(&Endpoint::Tcp { addr }).await;
        assert!(matches!(result, Err(LinkError::ChannelOpen { .. })));
    }
}
