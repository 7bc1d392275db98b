//! Payloads of the REST collaborators.
//!
//! Only the shapes are modeled; fetching them is up to the host application.

use serde::Deserialize;

use chatline_core::protocol::{MessageId, UserId};

/// `GET /get_messages/{user_id}/`
pub fn messages_path(user_id: UserId) -> String {
    format!("/get_messages/{user_id}/")
}

/// `GET /get_users/`
pub const USERS_PATH: &str = "/get_users/";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeerInfo {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub is_online: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryMessage {
    pub id: MessageId,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub is_read: bool,
    pub is_sent_by_me: bool,
}

/// Body of `GET /get_messages/{user_id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessagesResponse {
    pub user: PeerInfo,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub unread_count: u32,
}

/// Body of `GET /get_users/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn parses_history_payload() {
        let body = r#"{
            "user": {"id": 7, "username": "ana", "is_online": true},
            "messages": [
                {"id": 1, "content": "hi", "timestamp": "2024-01-01T10:00:00+00:00", "is_read": true, "is_sent_by_me": false},
                {"id": 2, "content": "yo", "timestamp": "2024-01-01T10:01:00+00:00", "is_read": false, "is_sent_by_me": true}
            ]
        }"#;
        let resp: MessagesResponse = serde_json::from_str(body).unwrap();
        assert!(resp.user.is_online);
        assert_eq!(resp.messages.len(), 2);
        assert!(resp.messages[1].is_sent_by_me);
        assert_eq!(messages_path(resp.user.id), "/get_messages/7/");
    }

    #[test]
    fn parses_user_list() {
        let body = r#"{"users": [{"id": 3, "username": "bo", "is_online": false, "unread_count": 4}]}"#;
        let resp: UsersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.users[0].unread_count, 4);
    }
}
