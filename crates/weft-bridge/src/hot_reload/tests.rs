use super::*;

use std::sync::{mpsc, Arc};
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use weft_config::schema::HotReloadConfig;

use crate::bus::EventBus;
use crate::channel::Channel;

const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(150);
const RETRY: Duration = Duration::from_millis(10);

/// Host and client endpoints sharing one temp pipe directory.
fn pair() -> (TempDir, PipeChannel, PipeChannel) {
    let dir = tempfile::tempdir().unwrap();
    let host = PipeChannel::new(dir.path(), "host", "client", RETRY);
    let client = PipeChannel::new(dir.path(), "client", "host", RETRY);
    (dir, host, client)
}

fn control_messages(channel: &PipeChannel) -> mpsc::Receiver<ControlMessage> {
    let (tx, rx) = mpsc::channel();
    let tx = std::sync::Mutex::new(tx);
    channel.on_control(move |message| {
        tx.lock().unwrap().send(message.clone()).unwrap();
    });
    rx
}

#[test]
fn reload_is_delivered_exactly_once() {
    let (_dir, host, client) = pair();
    let received = control_messages(&host);
    host.start_listener().unwrap();

    client.send_reload().unwrap();
    assert_eq!(received.recv_timeout(WAIT).unwrap(), ControlMessage::Reload);
    assert!(received.recv_timeout(QUIET).is_err());
}

#[cfg(unix)]
#[test]
fn second_listener_leaves_the_running_one_alone() {
    let (dir, host, client) = pair();
    let received = control_messages(&host);
    host.start_listener().unwrap();
    client.send_reload().unwrap();
    assert_eq!(received.recv_timeout(WAIT).unwrap(), ControlMessage::Reload);

    let err = transport::PipeReader::bind(transport::pipe_path(dir.path(), "host"))
        .err()
        .unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);

    // The empty liveness connection is not a control message.
    client.send_reload().unwrap();
    assert_eq!(received.recv_timeout(WAIT).unwrap(), ControlMessage::Reload);
    assert!(received.recv_timeout(QUIET).is_err());
}

#[test]
fn navigate_carries_content() {
    let (_dir, host, client) = pair();
    let received = control_messages(&host);
    host.start_listener().unwrap();

    client
        .send_navigate_to_content("<html><body>hi</body></html>")
        .unwrap();
    assert_eq!(
        received.recv_timeout(WAIT).unwrap(),
        ControlMessage::NavigateToContent {
            content: "<html><body>hi</body></html>".into()
        }
    );
}

#[test]
fn unknown_message_is_dropped_and_listener_keeps_going() {
    let (dir, host, client) = pair();
    let received = control_messages(&host);
    host.start_listener().unwrap();

    transport::send_message(
        dir.path(),
        "host",
        r#"{"messageType":"Bogus","messageBody":"{}"}"#,
        RETRY,
    )
    .unwrap();
    transport::send_message(dir.path(), "host", "not even json", RETRY).unwrap();
    client.send_reload().unwrap();

    assert_eq!(received.recv_timeout(WAIT).unwrap(), ControlMessage::Reload);
    assert!(received.recv_timeout(QUIET).is_err());
}

#[test]
fn frames_cross_in_both_directions() {
    let (_dir, host, client) = pair();
    host.start_listener().unwrap();
    client.start_listener().unwrap();

    let (host_tx, host_rx) = mpsc::channel();
    host.subscribe(Arc::new(move |m| host_tx.send(m).unwrap()));
    let (client_tx, client_rx) = mpsc::channel();
    client.subscribe(Arc::new(move |m| client_tx.send(m).unwrap()));

    client.send(r#"{"EventName":"up","Args":[]}"#).unwrap();
    host.send(r#"{"EventName":"down","Args":[]}"#).unwrap();

    assert_eq!(
        host_rx.recv_timeout(WAIT).unwrap(),
        r#"{"EventName":"up","Args":[]}"#
    );
    assert_eq!(
        client_rx.recv_timeout(WAIT).unwrap(),
        r#"{"EventName":"down","Args":[]}"#
    );
}

#[test]
fn event_bus_runs_over_pipes() {
    let (_dir, host, client) = pair();
    host.start_listener().unwrap();
    client.start_listener().unwrap();

    let client = Arc::new(client);
    let bus = EventBus::new(client.clone()).unwrap();
    let (tx, rx) = mpsc::channel();
    bus.on("Greeting", move |args| tx.send(args.to_vec()).unwrap())
        .unwrap();

    // The host relays whatever the "window" posts back to the client.
    let host = Arc::new(host);
    let relay = Arc::clone(&host);
    host.subscribe(Arc::new(move |frame| {
        let reply = frame.replace("Hello", "Greeting");
        relay.send(&reply).unwrap();
    }));

    bus.emit("Hello", vec![json!("world")]).unwrap();
    assert_eq!(rx.recv_timeout(WAIT).unwrap(), vec![json!("world")]);
}

#[test]
fn empty_payload_never_hits_the_pipe() {
    let (_dir, _host, client) = pair();
    assert!(matches!(
        client.send("   "),
        Err(weft_common::BridgeError::EmptyPayload)
    ));
}

#[test]
fn handling_updates_state_and_fans_out() {
    let (_dir, host, _client) = pair();
    assert_eq!(host.state(), ListenerState::Idle);

    let (frame_tx, frame_rx) = mpsc::channel();
    host.subscribe(Arc::new(move |m| frame_tx.send(m).unwrap()));
    let control = control_messages(&host);

    let forwarded = ControlMessage::ForwardedFrame {
        json: r#"{"EventName":"x","Args":[]}"#.into(),
    };
    host.handle_raw(&forwarded.encode().unwrap());

    assert_eq!(frame_rx.recv_timeout(WAIT).unwrap(), r#"{"EventName":"x","Args":[]}"#);
    assert_eq!(control.recv_timeout(WAIT).unwrap(), forwarded);
    assert_eq!(host.state(), ListenerState::Idle);

    host.handle_raw(r#"{"messageType":"Bogus","messageBody":"{}"}"#);
    assert!(control.recv_timeout(QUIET).is_err());
    assert_eq!(host.state(), ListenerState::Idle);
}

#[test]
fn listener_waits_for_connections() {
    let (_dir, host, _client) = pair();
    host.start_listener().unwrap();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(host.state(), ListenerState::WaitingForConnection);
}

#[test]
fn roles_swap_pipe_names() {
    let config = HotReloadConfig {
        pipe_dir: "/run/weft".into(),
        ..Default::default()
    };
    let host = PipeChannel::from_config(&config, PipeRole::Host);
    assert_eq!(host.pipe_in(), "WeftWindowHost");
    assert_eq!(host.pipe_out(), "WeftWindowClient");
    assert_eq!(host.dir(), std::path::Path::new("/run/weft"));

    let client = PipeChannel::from_config(&config, PipeRole::Client);
    assert_eq!(client.pipe_in(), "WeftWindowClient");
    assert_eq!(client.pipe_out(), "WeftWindowHost");
}
