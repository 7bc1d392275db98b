//! chatline demo client
//!
//! Usage: `chatline [config.yaml] [room:NAME | user:ID]`
//! - Connects to the configured endpoint and keeps reconnecting
//! - Every stdin line is sent as a chat message to the target
//! - Inbound messages are logged (RUST_LOG=info)

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

use chatline_client::config;
use chatline_client::transport::WsConnector;
use chatline_client::RealtimeClient;
use chatline_core::protocol::{Inbound, InboundKind, Target};

fn parse_target(s: &str) -> Option<Target> {
    match s.split_once(':')? {
        ("room", name) if !name.is_empty() => Some(Target::room(name)),
        ("user", id) => id.parse().ok().map(Target::User),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "chatline.yaml".to_string());
    let target = args
        .next()
        .map(|s| parse_target(&s).expect("target must be room:NAME or user:ID"))
        .unwrap_or_else(|| Target::room("lobby"));

    let cfg = config::load_from_file(&path).expect("config load failed");
    let (client, handle) = RealtimeClient::new(&cfg, WsConnector).expect("endpoint must resolve");

    for kind in InboundKind::ALL {
        handle.on_message(kind, |msg: &Inbound| {
            tracing::info!(kind = msg.kind().as_str(), ?msg, "inbound");
        });
    }

    let driver = tokio::spawn(client.run());
    tracing::info!(endpoint = handle.endpoint(), %target, "chatline starting");
    handle.connect().expect("driver is running");

    if let Target::Room(room) = &target {
        if let Err(e) = handle.join_room(room.clone()) {
            tracing::warn!(code = e.kind().as_str(), error = %e, %room, "join not sent");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match handle.send_chat(target.clone(), &line) {
            Ok(_) => {}
            Err(e) => tracing::warn!(code = e.kind().as_str(), error = %e, "not sent"),
        }
    }

    let _ = handle.close();
    let _ = handle.shutdown();
    let _ = driver.await;
}
