//! Room chat: current room, roster, system lines and room typing indicator.

use chrono::{DateTime, Utc};

use chatline_core::error::Result;
use chatline_core::protocol::inbound::{ChatMessage, RoomInfo};
use chatline_core::protocol::{Inbound, InboundKind, Outbound, OutboundBody, Target};

use crate::format::parse_timestamp;
use crate::views::ChatView;

/// Room joined before the server says otherwise.
pub const DEFAULT_ROOM: &str = "lobby";

const KINDS: &[InboundKind] = &[
    InboundKind::ChatMessage,
    InboundKind::Typing,
    InboundKind::RoomList,
    InboundKind::RoomChange,
    InboundKind::UserJoin,
    InboundKind::UserLeave,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomLine {
    Chat {
        username: String,
        message: String,
        timestamp: Option<DateTime<Utc>>,
        mine: bool,
        /// Shown optimistically, server echo not seen yet.
        pending: bool,
    },
    System(String),
}

#[derive(Debug)]
pub struct RoomChat {
    me: String,
    room: String,
    lines: Vec<RoomLine>,
    users: Vec<String>,
    rooms: Vec<RoomInfo>,
    typing: Option<String>,
}

impl RoomChat {
    /// `me` is our username, used to recognize the server echo of our lines.
    pub fn new(me: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            room: DEFAULT_ROOM.to_string(),
            lines: Vec::new(),
            users: Vec::new(),
            rooms: Vec::new(),
            typing: None,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn lines(&self) -> &[RoomLine] {
        &self.lines
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn rooms(&self) -> &[RoomInfo] {
        &self.rooms
    }

    /// Who is typing in the current room, if anyone.
    pub fn typing(&self) -> Option<&str> {
        self.typing.as_deref()
    }

    pub fn target(&self) -> Target {
        Target::room(self.room.clone())
    }

    pub fn compose(&mut self, text: &str, now: DateTime<Utc>) -> Result<Outbound> {
        let out = Outbound::chat(self.target(), text)?;
        if let OutboundBody::ChatMessage { message, .. } = out.body() {
            self.lines.push(RoomLine::Chat {
                username: self.me.clone(),
                message: message.clone(),
                timestamp: Some(now),
                mine: true,
                pending: true,
            });
        }
        Ok(out)
    }

    /// Switch rooms locally; `None` when already there.
    pub fn join(&mut self, room: &str) -> Option<Outbound> {
        if room == self.room {
            return None;
        }
        self.enter(room, format!("You joined {room}"));
        for r in &mut self.rooms {
            r.joined = r.name == room;
        }
        Some(Outbound::join_room(room))
    }

    fn enter(&mut self, room: &str, banner: String) {
        self.room = room.to_string();
        self.lines.clear();
        self.typing = None;
        self.lines.push(RoomLine::System(banner));
    }

    fn on_chat(&mut self, m: &ChatMessage) {
        if m.room.as_deref().is_some_and(|r| r != self.room) {
            return;
        }
        let username = m.sender_username.clone().unwrap_or_default();
        let timestamp = m.timestamp.as_deref().and_then(parse_timestamp);
        let mine = username == self.me;

        if mine {
            let echo = self.lines.iter_mut().find(|l| {
                matches!(l, RoomLine::Chat { pending: true, message, .. } if *message == m.message)
            });
            if let Some(RoomLine::Chat {
                pending,
                timestamp: ts,
                ..
            }) = echo
            {
                *pending = false;
                if timestamp.is_some() {
                    *ts = timestamp;
                }
                return;
            }
        }
        if self.typing.as_deref() == Some(username.as_str()) {
            self.typing = None;
        }
        self.lines.push(RoomLine::Chat {
            username,
            message: m.message.clone(),
            timestamp,
            mine,
            pending: false,
        });
    }
}

impl ChatView for RoomChat {
    fn kinds(&self) -> &'static [InboundKind] {
        KINDS
    }

    fn apply(&mut self, msg: &Inbound) -> Option<Outbound> {
        match msg {
            Inbound::ChatMessage(m) => self.on_chat(m),
            Inbound::UserJoin(r) => {
                self.lines.push(RoomLine::System(format!("{} joined the room", r.username)));
                self.users = r.users.clone();
            }
            Inbound::UserLeave(r) => {
                self.lines.push(RoomLine::System(format!("{} left the room", r.username)));
                self.users = r.users.clone();
                if self.typing.as_deref() == Some(r.username.as_str()) {
                    self.typing = None;
                }
            }
            Inbound::Typing(t) => {
                let here = t.room.as_deref().map_or(true, |r| r == self.room);
                match t.username.as_deref() {
                    Some(who) if here && who != self.me => {
                        self.typing = t.typing.then(|| who.to_string());
                    }
                    _ => {}
                }
            }
            Inbound::RoomList(l) => self.rooms = l.rooms.clone(),
            Inbound::RoomChange(c) => {
                self.enter(&c.room, format!("Welcome to {}", c.room));
                self.users = c.users.clone();
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chatline_core::protocol::decode_inbound;

    use super::*;

    fn feed(view: &mut RoomChat, frame: &str) {
        view.apply(&decode_inbound(frame).unwrap());
    }

    #[test]
    fn own_line_is_reconciled_by_echo() {
        let mut v = RoomChat::new("ana");
        let out = v.compose("hello", Utc::now()).unwrap();
        assert_eq!(out, Outbound::chat(Target::room("lobby"), "hello").unwrap());

        feed(&mut v, r#"{"type":"chat_message","message":"hello","username":"ana","room":"lobby"}"#);
        assert_eq!(v.lines().len(), 1);
        assert!(matches!(&v.lines()[0], RoomLine::Chat { pending: false, mine: true, .. }));

        feed(&mut v, r#"{"type":"chat_message","message":"hello","username":"bo","room":"lobby"}"#);
        assert_eq!(v.lines().len(), 2);
    }

    #[test]
    fn roster_events_add_system_lines() {
        let mut v = RoomChat::new("ana");
        feed(&mut v, r#"{"type":"user_join","username":"bo","users":["ana","bo"]}"#);
        feed(&mut v, r#"{"type":"user_leave","username":"bo","users":["ana"]}"#);
        assert_eq!(
            v.lines(),
            &[
                RoomLine::System("bo joined the room".into()),
                RoomLine::System("bo left the room".into()),
            ]
        );
        assert_eq!(v.users(), &["ana".to_string()]);
    }

    #[test]
    fn room_change_resets_the_view() {
        let mut v = RoomChat::new("ana");
        feed(&mut v, r#"{"type":"chat_message","message":"old","username":"bo"}"#);
        feed(&mut v, r#"{"type":"room_change","room":"rust","users":["ana"]}"#);
        assert_eq!(v.room(), "rust");
        assert_eq!(v.lines(), &[RoomLine::System("Welcome to rust".into())]);

        // lines for other rooms are not shown
        feed(&mut v, r#"{"type":"chat_message","message":"x","username":"bo","room":"lobby"}"#);
        assert_eq!(v.lines().len(), 1);
    }

    #[test]
    fn join_marks_room_and_skips_current() {
        let mut v = RoomChat::new("ana");
        feed(&mut v, r#"{"type":"room_list","rooms":[{"name":"lobby","joined":true},{"name":"rust"}]}"#);
        assert!(v.join("lobby").is_none());
        assert_eq!(v.join("rust"), Some(Outbound::join_room("rust")));
        assert!(v.rooms()[1].joined);
        assert!(!v.rooms()[0].joined);
        assert_eq!(v.target(), Target::room("rust"));
    }

    #[test]
    fn typing_indicator_ignores_self() {
        let mut v = RoomChat::new("ana");
        feed(&mut v, r#"{"type":"typing","username":"ana","typing":true,"room":"lobby"}"#);
        assert!(v.typing().is_none());
        feed(&mut v, r#"{"type":"typing","username":"bo","typing":true,"room":"lobby"}"#);
        assert_eq!(v.typing(), Some("bo"));
        feed(&mut v, r#"{"type":"typing","username":"bo","typing":false,"room":"lobby"}"#);
        assert!(v.typing().is_none());
    }
}
