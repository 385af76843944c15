use parley::protocol::{ChatMessage, MessageKind};
use parley::state::AppState;
use std::sync::Arc;
use tokio::sync::mpsc;

fn drain(rx: &mut mpsc::UnboundedReceiver<ChatMessage>) -> Vec<ChatMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

async fn connect(state: &AppState, conn: &str) -> mpsc::UnboundedReceiver<ChatMessage> {
    let (tx, rx) = mpsc::unbounded_channel();
    state.connections.register(conn.to_string(), tx).await;
    rx
}

/// End-to-end relay flow: two clients join, chat, and one drops.
#[tokio::test]
async fn test_full_relay_flow() {
    let state = Arc::new(AppState::new());
    let a = "conn-a".to_string();
    let b = "conn-b".to_string();

    // 1. Both sockets open
    let mut rx_a = connect(&state, &a).await;
    let mut rx_b = connect(&state, &b).await;
    assert_eq!(state.connections.len().await, 2);
    assert_eq!(state.registry.len().await, 0);

    // 2. Alice announces herself, then Bob
    state
        .router
        .on_inbound_message(&a, r#"{"type":"JOIN","sender":"alice","content":""}"#)
        .await
        .expect("alice's JOIN should be accepted");
    state
        .router
        .on_inbound_message(&b, r#"{"type":"JOIN","sender":"bob","content":""}"#)
        .await
        .expect("bob's JOIN should be accepted");

    assert_eq!(state.registry.lookup(&a).await, Some("alice".to_string()));
    assert_eq!(state.registry.lookup(&b).await, Some("bob".to_string()));

    // 3. Both hear both JOINs, in join order (alice's own echo included)
    for rx in [&mut rx_a, &mut rx_b] {
        let received = drain(rx);
        assert_eq!(received.len(), 2);
        assert!(received
            .iter()
            .all(|m| m.kind == MessageKind::Join));
        assert_eq!(received[0].sender.as_deref(), Some("alice"));
        assert_eq!(received[1].sender.as_deref(), Some("bob"));
    }

    // 4. Alice says hi; everyone hears it, alice included
    let delivered = state
        .router
        .on_inbound_message(&a, r#"{"type":"CHAT","sender":"alice","content":"hi"}"#)
        .await
        .expect("chat should be accepted");
    assert_eq!(delivered, 2);

    for rx in [&mut rx_a, &mut rx_b] {
        let received = drain(rx);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind, MessageKind::Chat);
        assert_eq!(received[0].sender.as_deref(), Some("alice"));
        assert_eq!(received[0].content, "hi");
    }

    // 5. Bob's socket drops without a goodbye
    state.connections.deregister(&b).await;
    let delivered = state.router.on_connection_closed(&b).await;

    // 6. Alice — and only alice — hears the synthesized LEAVE
    assert_eq!(delivered, 1);
    let received = drain(&mut rx_a);
    assert_eq!(received, vec![ChatMessage::leave("bob".to_string())]);
    assert!(drain(&mut rx_b).is_empty());
    assert_eq!(state.registry.lookup(&b).await, None);
    assert_eq!(state.registry.len().await, 1);
}

/// A connection that never announced itself disappears silently.
#[tokio::test]
async fn test_silent_disconnect_before_join() {
    let state = Arc::new(AppState::new());
    let a = "conn-a".to_string();
    let b = "conn-b".to_string();

    let _rx_a = connect(&state, &a).await;
    let mut rx_b = connect(&state, &b).await;

    state.connections.deregister(&a).await;
    let delivered = state.router.on_connection_closed(&a).await;

    assert_eq!(delivered, 0);
    assert!(drain(&mut rx_b).is_empty());
}

/// Malformed payloads are rejected without disturbing registry or peers.
#[tokio::test]
async fn test_malformed_payload_is_isolated() {
    let state = Arc::new(AppState::new());
    let a = "conn-a".to_string();
    let b = "conn-b".to_string();

    let mut rx_a = connect(&state, &a).await;
    let mut rx_b = connect(&state, &b).await;
    state
        .router
        .on_inbound_message(&b, r#"{"type":"JOIN","sender":"bob","content":""}"#)
        .await
        .unwrap();
    drain(&mut rx_a);
    drain(&mut rx_b);

    for raw in [
        r#"{"type":"YELL","sender":"alice","content":"HI"}"#,
        r#"{"type":"JOIN","content":""}"#,
        r#"{"type":"LEAVE","sender":"alice","content":""}"#,
        "garbage",
    ] {
        assert!(
            state.router.on_inbound_message(&a, raw).await.is_err(),
            "{raw} should be rejected"
        );
    }

    // Nothing changed and no one heard anything.
    assert_eq!(state.registry.lookup(&a).await, None);
    assert_eq!(state.registry.len().await, 1);
    assert!(drain(&mut rx_a).is_empty());
    assert!(drain(&mut rx_b).is_empty());

    // The offending connection is still fully functional.
    let delivered = state
        .router
        .on_inbound_message(&a, r#"{"type":"JOIN","sender":"alice","content":""}"#)
        .await
        .unwrap();
    assert_eq!(delivered, 2);
}
