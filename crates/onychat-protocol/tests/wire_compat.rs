// Verify the JSON shapes browser clients send and expect.
// These tests ensure wire compatibility is never broken.

use chrono::{TimeZone, Utc};
use onychat_protocol::{ClientFrame, Message};

#[test]
fn client_frame_with_recipient() {
    let frame = ClientFrame::decode(r#"{"content":"hello","recipientId":"u-2"}"#).unwrap();
    assert_eq!(frame.content, "hello");
    assert_eq!(frame.recipient_id.as_deref(), Some("u-2"));
}

#[test]
fn client_frame_ignores_unknown_fields() {
    let frame = ClientFrame::decode(r#"{"content":"hello","extra":42}"#).unwrap();
    assert_eq!(frame.content, "hello");
}

#[test]
fn broadcast_uses_camel_case_keys() {
    let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let msg = Message::new("u-1", Some("ada@example.com".into()), Some("u-2".into()), "hi", ts);
    let json = msg.encode().unwrap();

    assert!(json.contains(r#""senderId":"u-1""#));
    assert!(json.contains(r#""senderDisplayName":"ada@example.com""#));
    assert!(json.contains(r#""recipientId":"u-2""#));
    assert!(json.contains(r#""content":"hi""#));
    assert!(json.contains(r#""timestamp":"2026-03-01T12:00:00Z""#));
}

#[test]
fn absent_optionals_are_omitted_not_empty() {
    let msg = Message::new("u-1", None, None, "hi", Utc::now());
    let json = msg.encode().unwrap();

    // optional keys must be absent, never "" or null
    assert!(!json.contains("senderDisplayName"));
    assert!(!json.contains("recipientId"));

    let back = Message::decode(&json).unwrap();
    assert_eq!(back, msg);
    assert_eq!(back.sender_display_name(), None);
    assert_eq!(back.recipient_id(), None);
}

#[test]
fn full_message_survives_the_wire() {
    let msg = Message::new("u-1", Some("Ada".into()), Some("u-9".into()), "ciao", Utc::now());
    let back = Message::decode(&msg.encode().unwrap()).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn timestamp_is_rfc3339() {
    let json = Message::new("u-1", None, None, "x", Utc::now()).encode().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let ts = value["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}
