//! Inbound frame vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use chatline_core::protocol::decode_inbound;
use chatline_core::protocol::inbound::{Inbound, Presence};

mod vector_loader;
use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn inbound_vectors() {
    let files = [
        "chat_message_direct.json",
        "message_sent.json",
        "user_status_offline.json",
        "room_list.json",
        "bad_json.json",
        "missing_type.json",
        "unknown_type.json",
        "bad_presence.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode_inbound(&v.frame);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.kind().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let msg = res.expect("expected ok frame");
        let ex = v.expect.expect("missing expect block");
        assert_eq!(msg.kind().as_str(), ex["kind"].as_str().unwrap(), "vector={}", v.description);

        match msg {
            Inbound::ChatMessage(m) => {
                assert_eq!(m.sender_id, ex["sender_id"].as_i64(), "vector={}", v.description);
                assert_eq!(m.message_id, ex["message_id"].as_i64(), "vector={}", v.description);
            }
            Inbound::MessageSent(m) => {
                assert_eq!(m.message_id, ex["message_id"].as_i64().unwrap(), "vector={}", v.description);
                assert_eq!(m.receiver_id, ex["receiver_id"].as_i64().unwrap(), "vector={}", v.description);
            }
            Inbound::UserStatus(s) => {
                assert_eq!(s.user_id, ex["user_id"].as_i64().unwrap(), "vector={}", v.description);
                assert_eq!(s.status, Presence::Offline, "vector={}", v.description);
            }
            Inbound::RoomList(l) => {
                assert_eq!(l.rooms.len() as u64, ex["rooms"].as_u64().unwrap(), "vector={}", v.description);
                assert!(l.rooms[0].joined);
                assert!(!l.rooms[1].joined);
            }
            other => panic!("no assertions for {other:?}"),
        }
    }
}

#[test]
fn room_roster_events() {
    let join = decode_inbound(r#"{"type":"user_join","username":"bo","users":["ana","bo"]}"#).unwrap();
    let Inbound::UserJoin(j) = join else { panic!("expected user_join") };
    assert_eq!(j.users, vec!["ana", "bo"]);

    let leave = decode_inbound(r#"{"type":"user_leave","username":"bo"}"#).unwrap();
    let Inbound::UserLeave(l) = leave else { panic!("expected user_leave") };
    assert!(l.users.is_empty());
}

#[test]
fn extra_fields_are_ignored() {
    let msg = decode_inbound(r#"{"type":"messages_read","reader_id":4,"read_at":"now"}"#).unwrap();
    assert_eq!(msg.kind().as_str(), "messages_read");
}
