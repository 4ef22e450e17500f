//! Behavior tests for the presence engine, driven through the
//! transport-facing frame queues.

use std::sync::Arc;

use tokio::sync::mpsc;

use tutorhub_core::config::realtime::RealtimeConfig;
use tutorhub_realtime::{broadcast, heartbeat};
use tutorhub_realtime::{Frame, PresenceEngine, RemoteInfo};

fn engine() -> Arc<PresenceEngine> {
    Arc::new(PresenceEngine::new(RealtimeConfig::default()))
}

fn drain(rx: &mut mpsc::Receiver<Frame>) -> Vec<Frame> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

fn texts(frames: &[Frame]) -> Vec<&str> {
    frames
        .iter()
        .filter_map(|f| match f {
            Frame::Text(t) => Some(t.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn greeting_sent_on_accept() {
    let engine = engine();
    let (_handle, mut rx) = engine.accept(RemoteInfo::default());

    let frames = drain(&mut rx);
    assert_eq!(
        texts(&frames),
        vec![r#"{"type":"connection","status":"connected"}"#]
    );
    assert_eq!(engine.open_connections(), 1);
}

#[tokio::test]
async fn register_broadcasts_count_to_all_members() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    let (c2, mut rx2) = engine.accept(RemoteInfo::default());
    drain(&mut rx1);
    drain(&mut rx2);

    engine.register("u1", &c1.id);
    assert_eq!(
        texts(&drain(&mut rx1)),
        vec![r#"{"type":"sessions","count":1}"#]
    );

    engine.register("u1", &c2.id);
    assert_eq!(
        texts(&drain(&mut rx1)),
        vec![r#"{"type":"sessions","count":2}"#]
    );
    assert_eq!(
        texts(&drain(&mut rx2)),
        vec![r#"{"type":"sessions","count":2}"#]
    );
    assert_eq!(engine.count_for("u1"), 2);
}

#[tokio::test]
async fn disconnect_notifies_survivors_only() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    let (c2, mut rx2) = engine.accept(RemoteInfo::default());
    engine.register("u1", &c1.id);
    engine.register("u1", &c2.id);
    drain(&mut rx1);
    drain(&mut rx2);

    engine.disconnect(&c1.id);

    assert_eq!(
        texts(&drain(&mut rx2)),
        vec![r#"{"type":"sessions","count":1}"#]
    );
    assert!(texts(&drain(&mut rx1)).is_empty());
    assert_eq!(engine.count_for("u1"), 1);
    assert_eq!(engine.open_connections(), 1);
}

#[tokio::test]
async fn last_disconnect_deletes_session_set() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    engine.register("u1", &c1.id);
    drain(&mut rx1);

    engine.disconnect(&c1.id);

    assert_eq!(engine.count_for("u1"), 0);
    assert_eq!(engine.user_count(), 0);
}

#[tokio::test]
async fn broadcast_to_unknown_user_is_noop() {
    let engine = engine();
    let (_c1, mut rx1) = engine.accept(RemoteInfo::default());
    drain(&mut rx1);

    engine.broadcast_user("nobody");

    assert!(drain(&mut rx1).is_empty());
    assert_eq!(engine.count_for("nobody"), 0);
}

#[tokio::test]
async fn disconnect_and_unregister_are_idempotent() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    engine.register("u1", &c1.id);
    drain(&mut rx1);

    engine.disconnect(&c1.id);
    engine.disconnect(&c1.id);
    engine.unregister(&c1.id);
    engine.unregister(&c1.id);

    assert_eq!(engine.open_connections(), 0);
    assert_eq!(engine.count_for("u1"), 0);
}

#[tokio::test]
async fn reregistration_moves_connection_between_identities() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    let (c2, mut rx2) = engine.accept(RemoteInfo::default());
    engine.register("u1", &c1.id);
    engine.register("u1", &c2.id);
    drain(&mut rx1);
    drain(&mut rx2);

    engine.register("u2", &c1.id);

    assert_eq!(engine.count_for("u1"), 1);
    assert_eq!(engine.count_for("u2"), 1);
    // c2 hears u1 shrink, c1 hears u2 grow.
    assert_eq!(
        texts(&drain(&mut rx2)),
        vec![r#"{"type":"sessions","count":1}"#]
    );
    assert_eq!(
        texts(&drain(&mut rx1)),
        vec![r#"{"type":"sessions","count":1}"#]
    );
}

#[tokio::test]
async fn unresponsive_connection_evicted_after_one_missed_sweep() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    let (c2, mut rx2) = engine.accept(RemoteInfo::default());
    engine.register("u1", &c1.id);
    engine.register("u1", &c2.id);
    drain(&mut rx1);
    drain(&mut rx2);

    // First sweep probes both; only c2 answers.
    engine.sweep();
    assert!(drain(&mut rx1).contains(&Frame::Ping));
    engine.mark_alive(&c2.id);

    // Second sweep evicts c1 and scrubs its membership.
    engine.sweep();

    assert!(drain(&mut rx1).contains(&Frame::Close));
    assert_eq!(engine.open_connections(), 1);
    assert_eq!(engine.count_for("u1"), 1);
    assert_eq!(
        texts(&drain(&mut rx2)),
        vec![r#"{"type":"sessions","count":1}"#]
    );
    assert_eq!(engine.metrics().snapshot().heartbeat_evictions, 1);
}

#[tokio::test]
async fn responsive_connection_survives_repeated_sweeps() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    drain(&mut rx1);

    for _ in 0..3 {
        engine.sweep();
        assert_eq!(drain(&mut rx1), vec![Frame::Ping]);
        engine.mark_alive(&c1.id);
    }

    assert_eq!(engine.open_connections(), 1);
}

#[tokio::test]
async fn inbound_router_register_and_get_updates() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    drain(&mut rx1);

    engine.handle_inbound(&c1.id, r#"{"type":"register","userId":"u1"}"#);
    assert_eq!(engine.count_for("u1"), 1);
    drain(&mut rx1);

    engine.handle_inbound(&c1.id, r#"{"type":"getUpdates","userId":"u1"}"#);
    assert_eq!(
        texts(&drain(&mut rx1)),
        vec![r#"{"type":"sessions","count":1}"#]
    );
}

#[tokio::test]
async fn malformed_inbound_is_dropped_without_closing() {
    let engine = engine();
    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    drain(&mut rx1);

    engine.handle_inbound(&c1.id, "not json");
    engine.handle_inbound(&c1.id, r#"{"type":"selfDestruct"}"#);
    engine.handle_inbound(&c1.id, r#"{"type":"register"}"#);

    assert!(drain(&mut rx1).is_empty());
    assert_eq!(engine.open_connections(), 1);
    assert_eq!(engine.metrics().snapshot().messages_rejected, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_register_disconnect_loses_no_updates() {
    let engine = engine();
    let mut tasks = Vec::new();

    for worker in 0..8 {
        let engine = Arc::clone(&engine);
        tasks.push(tokio::spawn(async move {
            let mut receivers = Vec::new();
            for i in 0..50 {
                let (handle, rx) = engine.accept(RemoteInfo::default());
                engine.register("shared", &handle.id);
                if i % 2 == 0 {
                    engine.disconnect(&handle.id);
                } else {
                    receivers.push((handle, rx));
                }
            }
            let _ = worker;
            receivers
        }));
    }

    let mut kept = Vec::new();
    for task in tasks {
        kept.extend(task.await.expect("worker task panicked"));
    }

    assert_eq!(engine.count_for("shared"), kept.len());
    assert_eq!(engine.open_connections(), kept.len());
}

#[tokio::test(start_paused = true)]
async fn periodic_refresh_delivers_without_mutations() {
    let config = RealtimeConfig {
        broadcast_interval_seconds: 1,
        ..RealtimeConfig::default()
    };
    let engine = Arc::new(PresenceEngine::new(config));
    let task = broadcast::spawn(Arc::clone(&engine));

    let (c1, mut rx1) = engine.accept(RemoteInfo::default());
    engine.register("u1", &c1.id);
    drain(&mut rx1);

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let refreshed = texts(&drain(&mut rx1))
        .iter()
        .any(|t| *t == r#"{"type":"sessions","count":1}"#);
    assert!(refreshed, "expected a periodic count refresh");

    engine.shutdown();
    task.await.expect("broadcast task panicked");
}

#[tokio::test(start_paused = true)]
async fn background_tasks_stop_on_shutdown() {
    let engine = engine();
    let hb = heartbeat::spawn(Arc::clone(&engine));
    let bc = broadcast::spawn(Arc::clone(&engine));
    let (_c1, mut rx1) = engine.accept(RemoteInfo::default());
    drain(&mut rx1);

    engine.shutdown();

    hb.await.expect("heartbeat task panicked");
    bc.await.expect("broadcast task panicked");
    assert_eq!(engine.open_connections(), 0);
    assert!(drain(&mut rx1).contains(&Frame::Close));
}
