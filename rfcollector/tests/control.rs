mod support;

use std::sync::Arc;
use std::time::Duration;

use rfcollector::control::{self, InteractiveSource, UdpSource};
use rfcollector::{
    ChannelSink, Command, CommandSource, CommandVerb, Session, SessionConfig, SessionState,
    Transition,
};
use rfcollector_core::MessageType;
use tokio::io::BufReader;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use support::{job, reader_config, FakeReader};

async fn ready_session(reader: &FakeReader) -> Session {
    let (sink, _) = ChannelSink::new(16);
    let session = Session::new(SessionConfig::default(), Arc::new(sink), None);
    session
        .open(Box::new(reader.clone()), reader_config(), job())
        .await
        .unwrap();
    session
}

async fn wait_for(session: &Session, state: SessionState) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while session.state() != state {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("session never reached {state}"));
}

#[tokio::test]
async fn test_shutdown_listener_stops_scanning() {
    let reader = FakeReader::new();
    let session = ready_session(&reader).await;
    session.start().await.unwrap();

    let command = Command::new(CommandVerb::ShutdownListener, CommandSource::Interactive);
    let transition = control::apply(&session, command).await.unwrap();

    assert!(transition.is_applied());
    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(reader.count(MessageType::StopRoSpec), 1);
}

#[tokio::test(start_paused = true)]
async fn test_interactive_collection() {
    let reader = FakeReader::new();
    let session = ready_session(&reader).await;
    let input: &[u8] = b"x\nP\n";

    InteractiveSource::new(
        session.clone(),
        input,
        Duration::from_secs(20),
        CancellationToken::new(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(reader.count(MessageType::StartRoSpec), 1);
    assert_eq!(reader.count(MessageType::StopRoSpec), 1);
}

#[tokio::test(start_paused = true)]
async fn test_interactive_survives_undecodable_line() {
    let reader = FakeReader::new();
    let session = ready_session(&reader).await;
    let input: &[u8] = b"\xe9\nP\n";

    InteractiveSource::new(
        session.clone(),
        input,
        Duration::from_secs(20),
        CancellationToken::new(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(reader.count(MessageType::StartRoSpec), 1);
    assert_eq!(reader.count(MessageType::StopRoSpec), 1);
}

#[tokio::test]
async fn test_shutdown_closes_session_once() {
    let reader = FakeReader::new();
    let session = ready_session(&reader).await;
    let cancel = CancellationToken::new();
    let mut sources = JoinSet::new();

    // Input that never ends keeps the interactive source waiting
    let (_stdin, input) = tokio::io::duplex(64);
    sources.spawn(
        InteractiveSource::new(
            session.clone(),
            BufReader::new(input),
            Duration::from_secs(20),
            cancel.child_token(),
        )
        .run(),
    );
    let udp = UdpSource::bind(
        session.clone(),
        "127.0.0.1:0".parse().unwrap(),
        cancel.child_token(),
    )
    .await
    .unwrap();
    sources.spawn(udp.run());

    let closed = control::shutdown(&session, &mut sources, &cancel).await;

    assert_eq!(
        closed,
        Transition::Applied {
            from: SessionState::Ready,
            to: SessionState::Closed
        }
    );
    assert!(sources.is_empty());
    assert!(!reader.is_open());
    assert_eq!(reader.count(MessageType::DisableRoSpec), 1);
    assert_eq!(reader.count(MessageType::CloseConnection), 1);

    let again = control::shutdown(&session, &mut sources, &cancel).await;
    assert!(!again.is_applied());
    assert_eq!(reader.count(MessageType::CloseConnection), 1);
}

#[tokio::test]
async fn test_udp_commands_drive_session() {
    let reader = FakeReader::new();
    let session = ready_session(&reader).await;
    let source = UdpSource::bind(
        session.clone(),
        "127.0.0.1:0".parse().unwrap(),
        CancellationToken::new(),
    )
    .await
    .unwrap();
    let target = source.local_addr().unwrap();
    let task = tokio::spawn(source.run());

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(b"START", target).await.unwrap();
    wait_for(&session, SessionState::Running).await;

    // A second start is a no-op
    client.send_to(b"start", target).await.unwrap();
    client.send_to(b"CLOSE\n", target).await.unwrap();
    task.await.unwrap().unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(reader.count(MessageType::StartRoSpec), 1);
    assert_eq!(reader.count(MessageType::StopRoSpec), 1);

    // The listener is gone but the session is still open
    assert!(session.start().await.unwrap().is_applied());
}
