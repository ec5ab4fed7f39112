//! Integration tests for the registry actor.
//!
//! These tests verify the registry works correctly as a complete
//! system through the `spawn_registry()` function and the
//! `RegistryHandle` interface: atomic admission, safe eviction,
//! snapshot consistency, and dispatch delivery through per-peer
//! outbound queues.
//!
//! Tests CAN use `.unwrap()` and `.expect()` - the panic-free policy
//! applies to production code only.

use std::time::Duration;

use hub_core::{Dispatch, MembershipEvent, NameError, PeerName};
use hub_protocol::{MessageScope, ServerFrame};
use hubd::registry::{spawn_registry, Outbound, RegistryError, RegistryHandle};
use tokio::sync::mpsc;
use tokio::time::timeout;

// ============================================================================
// Constants
// ============================================================================

/// Maximum time to wait for a queued frame in tests.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a fresh outbound queue pair, as a session would.
fn outbound_queue() -> (Outbound, mpsc::UnboundedReceiver<ServerFrame>) {
    mpsc::unbounded_channel()
}

/// Admits a peer and returns its name and outbound receiver, with the
/// admission frames (NAMEACCEPTED, USERLIST) already consumed.
async fn admit(
    handle: &RegistryHandle,
    name: &str,
) -> (PeerName, mpsc::UnboundedReceiver<ServerFrame>) {
    let (tx, mut rx) = outbound_queue();
    let admitted = handle
        .try_admit(name, tx)
        .await
        .expect("admission should succeed");

    assert_eq!(recv_frame(&mut rx).await, ServerFrame::NameAccepted);
    assert!(matches!(
        recv_frame(&mut rx).await,
        ServerFrame::UserList { .. }
    ));

    (admitted, rx)
}

/// Receives the next frame from an outbound queue, failing the test if
/// none arrives in time.
async fn recv_frame(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) -> ServerFrame {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("frame should arrive in time")
        .expect("queue should stay open")
}

/// Asserts that no frame is currently queued.
fn assert_empty(rx: &mut mpsc::UnboundedReceiver<ServerFrame>) {
    assert!(
        rx.try_recv().is_err(),
        "expected no queued frames for this peer"
    );
}

// ============================================================================
// Admission Tests
// ============================================================================

#[tokio::test]
async fn test_basic_admission() {
    let handle = spawn_registry();

    let (alice, _rx) = admit(&handle, "alice").await;
    assert_eq!(alice.as_str(), "alice");

    let names = handle.snapshot().await;
    assert_eq!(names, vec![alice]);

    assert!(handle.is_connected());
}

#[tokio::test]
async fn test_admission_sends_snapshot_including_self() {
    let handle = spawn_registry();
    let (_alice, _rx) = admit(&handle, "alice").await;

    let (tx, mut rx) = outbound_queue();
    handle.try_admit("bob", tx).await.expect("should admit");

    assert_eq!(recv_frame(&mut rx).await, ServerFrame::NameAccepted);
    match recv_frame(&mut rx).await {
        ServerFrame::UserList { names } => {
            assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
        }
        other => panic!("expected USERLIST, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_name_rejected() {
    let handle = spawn_registry();
    let (alice, _rx) = admit(&handle, "alice").await;

    let (tx, mut rx) = outbound_queue();
    let err = handle.try_admit("alice", tx).await;
    assert_eq!(err, Err(RegistryError::NameTaken(alice.clone())));

    // The loser gets nothing queued and the registry is unchanged.
    assert_empty(&mut rx);
    assert_eq!(handle.snapshot().await, vec![alice]);
}

#[tokio::test]
async fn test_invalid_names_rejected() {
    let handle = spawn_registry();

    let cases = ["", "   ", "\n"];
    for case in cases {
        let (tx, _rx) = outbound_queue();
        let err = handle.try_admit(case, tx).await;
        assert_eq!(
            err,
            Err(RegistryError::InvalidName(NameError::Empty)),
            "candidate {case:?}"
        );
    }

    let (tx, _rx) = outbound_queue();
    let err = handle.try_admit("two words", tx).await;
    assert!(matches!(
        err,
        Err(RegistryError::InvalidName(NameError::InvalidCharacter { .. }))
    ));

    assert!(handle.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_candidate_is_trimmed() {
    let handle = spawn_registry();

    let (tx, _rx) = outbound_queue();
    let name = handle
        .try_admit("  alice\r\n", tx)
        .await
        .expect("trimmed candidate should be valid");
    assert_eq!(name.as_str(), "alice");
}

#[tokio::test]
async fn test_concurrent_same_name_single_winner() {
    let handle = spawn_registry();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let (tx, rx) = outbound_queue();
            let result = handle.try_admit("alice", tx).await;
            (result, rx)
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for task in tasks {
        let (result, _rx) = task.await.expect("task should not panic");
        match result {
            Ok(_) => winners += 1,
            Err(RegistryError::NameTaken(_)) => losers += 1,
            Err(other) => panic!("unexpected admission error: {other:?}"),
        }
    }

    assert_eq!(winners, 1, "exactly one admission must win");
    assert_eq!(losers, 7);
    assert_eq!(handle.snapshot().await.len(), 1);
}

// ============================================================================
// Eviction Tests
// ============================================================================

#[tokio::test]
async fn test_name_reusable_after_evict() {
    let handle = spawn_registry();
    let (alice, _rx) = admit(&handle, "alice").await;

    assert!(handle.evict(&alice).await);
    assert!(handle.snapshot().await.is_empty());

    // The name is immediately admittable again.
    let (_alice2, _rx2) = admit(&handle, "alice").await;
    assert_eq!(handle.snapshot().await.len(), 1);
}

#[tokio::test]
async fn test_evict_absent_name_is_noop() {
    let handle = spawn_registry();
    let ghost = PeerName::parse("ghost").expect("valid name");

    assert!(!handle.evict(&ghost).await);
    // Double eviction from racing cleanup paths is also safe.
    let (alice, _rx) = admit(&handle, "alice").await;
    assert!(handle.evict(&alice).await);
    assert!(!handle.evict(&alice).await);
}

#[tokio::test]
async fn test_join_and_departure_announcements() {
    let handle = spawn_registry();
    let (_alice, mut alice_rx) = admit(&handle, "alice").await;
    let (bob, _bob_rx) = admit(&handle, "bob").await;

    // Existing peers get the incremental join, not a full snapshot.
    assert_eq!(
        recv_frame(&mut alice_rx).await,
        ServerFrame::UserJoined {
            name: "bob".to_string()
        }
    );

    handle.evict(&bob).await;

    assert_eq!(
        recv_frame(&mut alice_rx).await,
        ServerFrame::UserLeft {
            name: "bob".to_string()
        }
    );
    assert_eq!(
        recv_frame(&mut alice_rx).await,
        ServerFrame::Message {
            scope: MessageScope::Broadcast,
            sender: "Server".to_string(),
            text: "bob has left the chat.".to_string(),
        }
    );
}

#[tokio::test]
async fn test_snapshot_never_contains_departed_peer() {
    let handle = spawn_registry();
    let (_alice, _alice_rx) = admit(&handle, "alice").await;
    let (bob, _bob_rx) = admit(&handle, "bob").await;

    handle.evict(&bob).await;

    // A peer admitted after the eviction sees a snapshot without bob.
    let (tx, mut rx) = outbound_queue();
    handle.try_admit("carol", tx).await.expect("should admit");
    assert_eq!(recv_frame(&mut rx).await, ServerFrame::NameAccepted);
    match recv_frame(&mut rx).await {
        ServerFrame::UserList { names } => {
            assert_eq!(names, vec!["alice".to_string(), "carol".to_string()]);
        }
        other => panic!("expected USERLIST, got {other:?}"),
    }
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_broadcast_delivered_to_all_including_sender() {
    let handle = spawn_registry();
    let (alice, mut alice_rx) = admit(&handle, "alice").await;
    let (_bob, mut bob_rx) = admit(&handle, "bob").await;
    // alice sees bob join
    assert!(matches!(
        recv_frame(&mut alice_rx).await,
        ServerFrame::UserJoined { .. }
    ));

    handle
        .dispatch(Dispatch::Broadcast {
            sender: alice.clone(),
            text: "hi".to_string(),
        })
        .await;

    let expected = ServerFrame::Message {
        scope: MessageScope::Broadcast,
        sender: "alice".to_string(),
        text: "hi".to_string(),
    };
    assert_eq!(recv_frame(&mut alice_rx).await, expected);
    assert_eq!(recv_frame(&mut bob_rx).await, expected);
}

#[tokio::test]
async fn test_broadcast_preserves_sender_order() {
    let handle = spawn_registry();
    let (alice, _alice_rx) = admit(&handle, "alice").await;
    let (_bob, mut bob_rx) = admit(&handle, "bob").await;

    for i in 0..10 {
        handle
            .dispatch(Dispatch::Broadcast {
                sender: alice.clone(),
                text: format!("msg-{i}"),
            })
            .await;
    }

    for i in 0..10 {
        match recv_frame(&mut bob_rx).await {
            ServerFrame::Message { text, .. } => assert_eq!(text, format!("msg-{i}")),
            other => panic!("expected MESSAGE, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_private_skips_unknown_recipients() {
    let handle = spawn_registry();
    let (alice, mut alice_rx) = admit(&handle, "alice").await;
    let (_bob, mut bob_rx) = admit(&handle, "bob").await;
    assert!(matches!(
        recv_frame(&mut alice_rx).await,
        ServerFrame::UserJoined { .. }
    ));

    handle
        .dispatch(Dispatch::Private {
            sender: alice.clone(),
            recipients: vec!["bob".to_string(), "carol".to_string()],
            text: "hello".to_string(),
        })
        .await;

    assert_eq!(
        recv_frame(&mut bob_rx).await,
        ServerFrame::Message {
            scope: MessageScope::Private,
            sender: "alice".to_string(),
            text: "hello".to_string(),
        }
    );

    // The sender gets neither a copy nor an error.
    handle
        .dispatch(Dispatch::Broadcast {
            sender: alice.clone(),
            text: "marker".to_string(),
        })
        .await;
    match recv_frame(&mut alice_rx).await {
        ServerFrame::Message { text, .. } => assert_eq!(text, "marker"),
        other => panic!("expected marker broadcast, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dispatch_to_closed_queue_does_not_stall_others() {
    let handle = spawn_registry();
    let (alice, _alice_rx) = admit(&handle, "alice").await;
    let (_bob, mut bob_rx) = admit(&handle, "bob").await;
    let (_carol, carol_rx) = admit(&handle, "carol").await;

    // carol's writer is gone mid-disconnect
    drop(carol_rx);

    handle
        .dispatch(Dispatch::Broadcast {
            sender: alice.clone(),
            text: "still here".to_string(),
        })
        .await;

    // bob sees the join of carol, then the broadcast
    assert!(matches!(
        recv_frame(&mut bob_rx).await,
        ServerFrame::UserJoined { .. }
    ));
    match recv_frame(&mut bob_rx).await {
        ServerFrame::Message { text, .. } => assert_eq!(text, "still here"),
        other => panic!("expected MESSAGE, got {other:?}"),
    }
}

// ============================================================================
// Membership Event Tests
// ============================================================================

#[tokio::test]
async fn test_membership_events_published() {
    let handle = spawn_registry();
    let mut events = handle.subscribe();

    let (alice, _rx) = admit(&handle, "alice").await;
    assert_eq!(
        timeout(RECV_TIMEOUT, events.recv())
            .await
            .expect("timely event")
            .expect("open channel"),
        MembershipEvent::Joined(alice.clone())
    );

    handle.evict(&alice).await;
    assert_eq!(
        timeout(RECV_TIMEOUT, events.recv())
            .await
            .expect("timely event")
            .expect("open channel"),
        MembershipEvent::Left(alice)
    );
}
