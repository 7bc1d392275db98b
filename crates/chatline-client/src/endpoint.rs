//! Socket endpoint resolution.
//!
//! Accepts either a socket URL (`ws://`, `wss://`) or a page origin
//! (`http://`, `https://`). Origins are mapped to the matching socket scheme
//! and get the chat path appended when they carry none.

use url::Url;

use chatline_core::error::{ChatlineError, Result};

/// Path of the chat socket on the server.
pub const CHAT_PATH: &str = "/ws/chat/";

pub fn resolve(base: &str, token: Option<&str>) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| ChatlineError::Config(format!("invalid endpoint url: {e}")))?;

    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => {
            return Err(ChatlineError::Config(format!(
                "unsupported endpoint scheme: {other}"
            )))
        }
    };
    let from_origin = url.scheme().starts_with("http");
    url.set_scheme(scheme)
        .map_err(|_| ChatlineError::Config("cannot switch endpoint scheme".into()))?;

    if from_origin && url.path() == "/" {
        url.set_path(CHAT_PATH);
    }
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn page_origin_maps_to_socket_scheme() {
        assert_eq!(resolve("http://localhost:8000", None).unwrap().as_str(), "ws://localhost:8000/ws/chat/");
        assert_eq!(resolve("https://chat.example.com/", None).unwrap().as_str(), "wss://chat.example.com/ws/chat/");
    }

    #[test]
    fn socket_url_is_kept_and_token_appended() {
        let url = resolve("wss://chat.example.com/ws/chat/", Some("abc def")).unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.path(), "/ws/chat/");
        assert_eq!(url.query(), Some("token=abc+def"));
    }

    #[test]
    fn rejects_foreign_scheme() {
        let err = resolve("ftp://host/", None).unwrap_err();
        assert_eq!(err.kind().as_str(), "CONFIG");
    }
}
