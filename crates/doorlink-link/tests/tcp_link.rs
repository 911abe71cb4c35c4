//! DoorLink over a real loopback TCP socket.

use doorlink_core::ConnectionState;
use doorlink_link::{
    ConnectionEvent, DisconnectReason, DoorLink, LinkConfig, LinkError, LinkEvent, SystemTransport,
};
use doorlink_protocol::{Command, DoorState};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Door controller emulator: report Closed, read one command, hang up.
#[tokio::test]
async fn test_tcp_session_lifecycle() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (command_tx, command_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(&[0, 3]).await.unwrap();
        let command = stream.read_u8().await.unwrap();
        command_tx.send(command).unwrap();
    });

    let config = LinkConfig::default().connect_timeout(Duration::from_secs(2));
    let (link, mut events) = DoorLink::new(SystemTransport::default(), config);

    link.connect(&format!("tcp://{addr}")).await.unwrap();
    assert!(matches!(
        events.recv().await,
        Some(LinkEvent::Connection(ConnectionEvent::Succeeded { .. }))
    ));
    assert_eq!(events.recv().await, Some(LinkEvent::State(DoorState::Closed)));

    link.write(Command::Lock).await.unwrap();
    assert_eq!(command_rx.await.unwrap(), 4);

    assert_eq!(
        events.recv().await,
        Some(LinkEvent::Connection(ConnectionEvent::Disconnected {
            reason: DisconnectReason::RemoteClosed
        }))
    );
    assert_eq!(link.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_tcp_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let (link, mut events) = DoorLink::new(SystemTransport::default(), LinkConfig::default());
    let result = link.connect(&format!("tcp://{addr}")).await;

    assert!(matches!(result, Err(LinkError::ChannelOpen { .. })));
    assert!(matches!(
        events.recv().await,
        Some(LinkEvent::Connection(ConnectionEvent::Failed { .. }))
    ));
    assert_eq!(link.connection_state(), ConnectionState::Failed);
}
