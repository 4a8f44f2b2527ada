use super::message::{ClientMessage, ServerMessage};
use super::session::{Outcome, Session, SessionState};
use crate::broker::Broker;
use crate::client::Outbound;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tungstenite::protocol::Message as WsMessage;

fn open_session(broker: &Arc<Broker>) -> (Session, Receiver<WsMessage>) {
    let (outbound, rx) = Outbound::channel(16);
    (Session::open(broker.clone(), outbound), rx)
}

fn next_json(rx: &mut Receiver<WsMessage>) -> Value {
    match rx.try_recv().expect("expected a queued frame") {
        WsMessage::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("Expected a text message, got {other:?}"),
    }
}

#[test]
fn test_parse_client_messages() {
    let msg = ClientMessage::parse(r#"{"action":"identify","userId":"u1"}"#).unwrap();
    assert!(matches!(msg, ClientMessage::Identify { user_id: Some(ref u) } if *u == json!("u1")));

    let msg = ClientMessage::parse(r#"{"action":"identify","userId":42}"#).unwrap();
    assert!(matches!(msg, ClientMessage::Identify { user_id: Some(ref u) } if *u == json!(42)));

    let msg = ClientMessage::parse(r#"{"action":"subscribe"}"#).unwrap();
    assert!(matches!(msg, ClientMessage::Subscribe { conversation_id: None }));

    let msg = ClientMessage::parse(r#"{"action":"message","envelope":null,"extra":1}"#).unwrap();
    assert!(matches!(msg, ClientMessage::Message { envelope: None }));

    assert!(ClientMessage::parse(r#"{"action":"dance"}"#).is_err());
    assert!(ClientMessage::parse(r#"{"userId":"u1"}"#).is_err());
    assert!(ClientMessage::parse("not json at all").is_err());
}

#[test]
fn test_server_message_shapes() {
    let identified = ServerMessage::Identified { user_id: None };
    assert_eq!(
        serde_json::to_value(&identified).unwrap(),
        json!({ "action": "identified", "userId": null })
    );

    let history = ServerMessage::History {
        conversation_id: "room1".to_string(),
        history: vec![],
    };
    assert_eq!(
        serde_json::to_string(&history).unwrap(),
        r#"{"action":"history","conversationId":"room1","history":[]}"#
    );
}

#[test]
fn test_session_registers_and_cleans_up_once() {
    let broker = Arc::new(Broker::new());
    let (mut session, _rx) = open_session(&broker);
    let id = session.id();
    assert_eq!(session.state(), SessionState::Open);
    assert!(broker.is_connected(&id));

    session.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!broker.is_connected(&id));
    assert!(broker.subscribers_of("room1").is_empty());

    // second close and later frames are no-ops
    session.close();
    assert_eq!(
        session.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#),
        Outcome::Discarded
    );
    assert!(broker.subscribers_of("room1").is_empty());
}

#[test]
fn test_dropping_session_cleans_up() {
    let broker = Arc::new(Broker::new());
    let (session, _rx) = open_session(&broker);
    session.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    drop(session);
    assert_eq!(broker.connection_count(), 0);
    assert!(broker.subscribers_of("room1").is_empty());
}

#[test]
fn test_identify_sets_label_and_acknowledges() {
    let broker = Arc::new(Broker::new());
    let (session, mut rx) = open_session(&broker);

    let outcome = session.handle_text(r#"{"action":"identify","userId":"user-1"}"#);
    assert_eq!(outcome, Outcome::Identified);
    assert_eq!(broker.label_of(&session.id()), Some("user-1".to_string()));
    assert_eq!(
        next_json(&mut rx),
        json!({ "action": "identified", "userId": "user-1" })
    );

    // a later identify overwrites; a missing userId clears the label
    session.handle_text(r#"{"action":"identify"}"#);
    assert_eq!(broker.label_of(&session.id()), None);
    assert_eq!(
        next_json(&mut rx),
        json!({ "action": "identified", "userId": null })
    );
}

#[test]
fn test_identify_echoes_non_string_user_id() {
    let broker = Arc::new(Broker::new());
    let (session, mut rx) = open_session(&broker);

    let outcome = session.handle_text(r#"{"action":"identify","userId":42}"#);
    assert_eq!(outcome, Outcome::Identified);
    assert_eq!(broker.label_of(&session.id()), Some("42".to_string()));
    assert_eq!(
        next_json(&mut rx),
        json!({ "action": "identified", "userId": 42 })
    );

    session.handle_text(r#"{"action":"identify","userId":{"name":"bob"}}"#);
    assert_eq!(
        next_json(&mut rx),
        json!({ "action": "identified", "userId": { "name": "bob" } })
    );
}

#[test]
fn test_subscribe_on_empty_server_returns_empty_history() {
    let broker = Arc::new(Broker::new());
    let (session, mut rx) = open_session(&broker);

    let outcome = session.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    assert_eq!(outcome, Outcome::Subscribed { history: 0 });
    assert_eq!(
        next_json(&mut rx),
        json!({ "action": "history", "conversationId": "room1", "history": [] })
    );
}

#[test]
fn test_subscribe_without_conversation_is_discarded() {
    let broker = Arc::new(Broker::new());
    let (session, mut rx) = open_session(&broker);

    for text in [
        r#"{"action":"subscribe"}"#,
        r#"{"action":"subscribe","conversationId":""}"#,
        r#"{"action":"subscribe","conversationId":null}"#,
    ] {
        assert_eq!(session.handle_text(text), Outcome::Discarded);
    }
    assert!(rx.try_recv().is_err());
    assert_eq!(broker.topic_count(), 0);
}

#[test]
fn test_message_fans_out_and_is_stored() {
    let broker = Arc::new(Broker::new());
    let (alice, mut alice_rx) = open_session(&broker);
    let (bob, mut bob_rx) = open_session(&broker);

    alice.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    bob.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    next_json(&mut alice_rx);
    next_json(&mut bob_rx);

    let outcome = alice.handle_text(
        r#"{"action":"message","envelope":{"conversationId":"room1","senderId":"u1","ciphertext":"abc"}}"#,
    );
    assert_eq!(outcome, Outcome::Published { delivered: 2, evicted: 0 });

    let expected = json!({
        "action": "message",
        "envelope": { "conversationId": "room1", "senderId": "u1", "ciphertext": "abc" }
    });
    assert_eq!(next_json(&mut bob_rx), expected);
    // publisher subscribed to the topic gets its own envelope back
    assert_eq!(next_json(&mut alice_rx), expected);

    let (carol, mut carol_rx) = open_session(&broker);
    carol.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    assert_eq!(
        next_json(&mut carol_rx),
        json!({
            "action": "history",
            "conversationId": "room1",
            "history": [{ "conversationId": "room1", "senderId": "u1", "ciphertext": "abc" }]
        })
    );
}

#[test]
fn test_incomplete_messages_are_discarded() {
    let broker = Arc::new(Broker::new());
    let (session, _rx) = open_session(&broker);

    for text in [
        r#"{"action":"message"}"#,
        r#"{"action":"message","envelope":{}}"#,
        r#"{"action":"message","envelope":"opaque"}"#,
        r#"{"action":"message","envelope":{"conversationId":"","ciphertext":"x"}}"#,
        r#"{"action":"message","envelope":{"senderId":"u1"}}"#,
    ] {
        assert_eq!(session.handle_text(text), Outcome::Discarded, "{text}");
    }
    assert_eq!(broker.topic_count(), 0);
}

#[test]
fn test_malformed_and_unknown_input_is_ignored() {
    let broker = Arc::new(Broker::new());
    let (session, mut rx) = open_session(&broker);

    assert_eq!(session.handle_text("{{{ nope"), Outcome::Discarded);
    assert_eq!(session.handle_text(r#"{"action":"shout"}"#), Outcome::Discarded);
    assert_eq!(session.handle_text("42"), Outcome::Discarded);
    assert!(rx.try_recv().is_err());
    assert_eq!(session.state(), SessionState::Open);
    assert!(broker.is_connected(&session.id()));
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let broker = Arc::new(Broker::new());
    let (reader, mut reader_rx) = open_session(&broker);
    let (writer, _writer_rx) = open_session(&broker);

    reader.handle_text(r#"{"action":"subscribe","conversationId":"room1"}"#);
    next_json(&mut reader_rx);
    assert_eq!(
        reader.handle_text(r#"{"action":"unsubscribe","conversationId":"room1"}"#),
        Outcome::Unsubscribed
    );

    writer.handle_text(r#"{"action":"message","envelope":{"conversationId":"room1","ciphertext":"x"}}"#);
    assert!(reader_rx.try_recv().is_err());
    assert_eq!(broker.history_of("room1").len(), 1);
}
