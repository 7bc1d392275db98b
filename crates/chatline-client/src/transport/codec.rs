//! Frame classification for the socket reader.
//!
//! - Text frames are surfaced to the dispatcher
//! - Binary frames are not part of the chat protocol and are skipped
//! - Ping/Pong are answered by tungstenite itself and only count as activity
//! - Close ends the stream

use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Control,
    Ignored { bytes_len: usize },
    Close,
}

pub fn classify(msg: Message) -> Frame {
    match msg {
        Message::Text(s) => Frame::Text(s),
        Message::Binary(b) => Frame::Ignored { bytes_len: b.len() },
        Message::Ping(_) | Message::Pong(_) => Frame::Control,
        Message::Close(_) => Frame::Close,
        Message::Frame(f) => Frame::Ignored {
            bytes_len: f.payload().len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_frames() {
        assert_eq!(classify(Message::Text("{}".into())), Frame::Text("{}".into()));
        assert_eq!(classify(Message::Binary(vec![1, 2, 3])), Frame::Ignored { bytes_len: 3 });
        assert_eq!(classify(Message::Ping(vec![])), Frame::Control);
        assert_eq!(classify(Message::Close(None)), Frame::Close);
    }
}
