//! Connection manager tests against the scripted mock server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use attic_ipc::AtticClient;
use attic_ipc::ClientError;
use attic_protocol::ProtocolError;
use common::MockServer;
use common::ServerAction;

fn connected_client(server: &MockServer) -> AtticClient {
    let client = AtticClient::new();
    client.connect(&server.endpoint()).expect("connect");
    client
}

#[test]
fn connect_performs_ping_handshake() {
    let server = MockServer::start();
    let client = connected_client(&server);

    assert!(client.is_connected());
    assert_eq!(server.requests(), vec!["ping".to_string()]);
}

#[test]
fn handshake_rejects_wrong_payload() {
    let server = MockServer::start();
    server.set("ping", ServerAction::Ok("hello".to_string()));

    let client = AtticClient::new();
    let err = client.connect(&server.endpoint()).unwrap_err();
    assert!(matches!(err, ClientError::HandshakeFailed(_)));
    assert!(!client.is_connected());
}

#[test]
fn handshake_rejects_error_reply() {
    let server = MockServer::start();
    server.set("ping", ServerAction::Err("busy".to_string()));

    let client = AtticClient::new();
    let err = client.connect(&server.endpoint()).unwrap_err();
    assert!(matches!(err, ClientError::HandshakeFailed(_)));
}

#[test]
fn handshake_times_out_on_silent_server() {
    let server = MockServer::start();
    server.set("ping", ServerAction::Hang);

    let client = AtticClient::new();
    let err = client.connect(&server.endpoint()).unwrap_err();
    assert!(matches!(err, ClientError::HandshakeFailed(_)));
    assert!(!client.is_connected());
}

#[test]
fn send_returns_success_reply() {
    let server = MockServer::start();
    server.set("status", ServerAction::Ok("running pc=$E000".to_string()));
    let client = connected_client(&server);

    let reply = client.send("status").unwrap();
    assert!(reply.success);
    assert_eq!(reply.payload, "running pc=$E000");
    assert_eq!(
        server.requests(),
        vec!["ping".to_string(), "status".to_string()]
    );
}

#[test]
fn send_surfaces_error_reply_without_disconnecting() {
    let server = MockServer::start();
    server.set("boot /missing", ServerAction::Err("No such file".to_string()));
    let client = connected_client(&server);

    let reply = client.send("boot /missing").unwrap();
    assert!(!reply.success);
    assert_eq!(reply.payload, "No such file");
    assert!(client.is_connected());
}

#[test]
fn events_seen_while_waiting_are_queued() {
    let server = MockServer::start();
    server.set(
        "resume",
        ServerAction::Events(
            vec![("breakpoint".to_string(), "$0600 A=$FF".to_string())],
            "resumed".to_string(),
        ),
    );
    let client = connected_client(&server);

    let reply = client.send("resume").unwrap();
    assert_eq!(reply.payload, "resumed");

    let events = client.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "breakpoint");
    assert_eq!(events[0].data, "$0600 A=$FF");

    // The drain is destructive.
    assert!(client.drain_events().is_empty());
}

#[test]
fn events_are_drained_in_arrival_order() {
    let server = MockServer::start();
    server.set(
        "resume",
        ServerAction::Events(
            vec![
                ("stopped".to_string(), "$E000".to_string()),
                ("error".to_string(), "bus fault".to_string()),
                ("custom".to_string(), String::new()),
            ],
            "ok".to_string(),
        ),
    );
    let client = connected_client(&server);

    client.send("resume").unwrap();
    let kinds: Vec<String> = client
        .drain_events()
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec!["stopped", "error", "custom"]);
}

#[test]
fn reply_spanning_multiple_reads_is_reassembled() {
    let server = MockServer::start();
    server.set(
        "read $0600 16",
        ServerAction::Chunked(vec![
            b"OK:da".to_vec(),
            b"ta A9,".to_vec(),
            b"00,8D\n".to_vec(),
        ]),
    );
    let client = connected_client(&server);

    let reply = client.send("read $0600 16").unwrap();
    assert!(reply.success);
    assert_eq!(reply.payload, "data A9,00,8D");
}

#[test]
fn one_read_may_carry_event_and_reply() {
    let server = MockServer::start();
    server.set(
        "step",
        ServerAction::Raw("EVENT:stopped $E001\nOK:stepped\n".to_string()),
    );
    let client = connected_client(&server);

    let reply = client.send("step").unwrap();
    assert_eq!(reply.payload, "stepped");
    let events = client.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "stopped");
}

#[test]
fn timeout_is_reported_as_timeout_and_disconnects() {
    let server = MockServer::start();
    server.set("hang", ServerAction::Hang);
    let client = connected_client(&server);

    let err = client
        .send_with_timeout("hang", Duration::from_millis(150))
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
    assert!(!client.is_connected());

    // Subsequent commands fail immediately until reconnected.
    assert!(matches!(
        client.send("status"),
        Err(ClientError::NotConnected)
    ));
}

#[test]
fn closed_peer_is_reported_as_closed() {
    let server = MockServer::start();
    server.set("quit", ServerAction::Close);
    let client = connected_client(&server);

    let err = client.send("quit").unwrap_err();
    assert!(matches!(err, ClientError::ConnectionClosed));
    assert!(!client.is_connected());
}

#[test]
fn malformed_frame_propagates_without_disconnecting() {
    let server = MockServer::start();
    server.set("weird", ServerAction::Raw("WHAT:ever\n".to_string()));
    let client = connected_client(&server);

    let err = client.send("weird").unwrap_err();
    assert!(matches!(
        err,
        ClientError::Protocol(ProtocolError::MalformedFrame(_))
    ));
    assert!(client.is_connected());
}

#[test]
fn queued_events_survive_disconnect_until_drained() {
    let server = MockServer::start();
    server.set(
        "resume",
        ServerAction::Events(
            vec![("stopped".to_string(), "$E000".to_string())],
            "ok".to_string(),
        ),
    );
    let client = connected_client(&server);
    client.send("resume").unwrap();
    client.disconnect();

    assert_eq!(client.drain_events().len(), 1);
}

#[test]
fn reconnect_after_disconnect() {
    let server = MockServer::start();
    let client = connected_client(&server);
    client.disconnect();
    assert!(!client.is_connected());

    client.connect(&server.endpoint()).expect("reconnect");
    assert!(client.is_connected());
}

#[test]
fn connect_twice_is_rejected() {
    let server = MockServer::start();
    let client = connected_client(&server);
    assert!(matches!(
        client.connect(&server.endpoint()),
        Err(ClientError::AlreadyConnected)
    ));
}

#[test]
fn serialized_sends_pair_replies_with_requests() {
    let server = MockServer::start();
    server.set("first", ServerAction::Ok("reply-one".to_string()));
    server.set("second", ServerAction::Ok("reply-two".to_string()));
    let client = Arc::new(connected_client(&server));

    let mut handles = Vec::new();
    for (command, expected) in [("first", "reply-one"), ("second", "reply-two")] {
        let client = Arc::clone(&client);
        handles.push(std::thread::spawn(move || {
            for _ in 0..20 {
                let reply = client.send(command).unwrap();
                assert_eq!(reply.payload, expected);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
