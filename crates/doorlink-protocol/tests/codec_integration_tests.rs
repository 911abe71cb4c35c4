//! Integration tests for DoorCodec with Tokio streams.
//!
//! These tests drive the codec over an in-memory duplex pipe, the same way
//! a session drives it over a real channel.

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio_util::codec::{Framed, FramedRead};
use doorlink_protocol::{Command, DoorCodec, DoorState, DoorStateMachine, Inbound, ResponseCode};

/// Helper function to create a framed host end and a raw remote end.
fn create_link(buffer_size: usize) -> (Framed<DuplexStream, DoorCodec>, DuplexStream) {
    let (host, remote) = tokio::io::duplex(buffer_size);
    (Framed::new(host, DoorCodec::new()), remote)
}

#[tokio::test]
async fn test_commands_arrive_as_single_bytes() {
    let (mut host, mut remote) = create_link(64);

    host.send(Command::Lock).await.unwrap();
    host.send(Command::Unlock).await.unwrap();
    host.send(Command::NoOp).await.unwrap();

    let mut buf = [0u8; 3];
    remote.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, [0x04, 0x05, 0x00]);
}

#[tokio::test]
async fn test_responses_decode_in_order() {
    let (mut host, mut remote) = create_link(64);

    remote.write_all(&[0x03, 0x00, 0x04, 0xFF, 0x05]).await.unwrap();
    drop(remote);

    let mut received = Vec::new();
    while let Some(item) = host.next().await {
        received.push(item.unwrap());
    }

    assert_eq!(
        received,
        vec![
            Inbound::Response(ResponseCode::Closed),
            Inbound::NoSignal(0x00),
            Inbound::Response(ResponseCode::Locked),
            Inbound::NoSignal(0xFF),
            Inbound::Response(ResponseCode::Unlocked),
        ]
    );
}

#[tokio::test]
async fn test_split_delivery_reassembles() {
    let (host, mut remote) = tokio::io::duplex(1);
    let mut reader = FramedRead::new(host, DoorCodec::new());

    let writer = tokio::spawn(async move {
        for byte in [0x02, 0x02, 0x03] {
            remote.write_all(&[byte]).await.unwrap();
        }
    });

    let mut machine = DoorStateMachine::new();
    let mut changes = Vec::new();
    for _ in 0..3 {
        let inbound = reader.next().await.unwrap().unwrap();
        if let Some(state) = inbound.response().and_then(|c| machine.observe(c)) {
            changes.push(state);
        }
    }
    writer.await.unwrap();

    assert_eq!(changes, vec![DoorState::Open, DoorState::Closed]);
}

#[tokio::test]
async fn test_stream_ends_when_remote_closes() {
    let (mut host, remote) = create_link(8);
    drop(remote);
    assert!(host.next().await.is_none());
}
