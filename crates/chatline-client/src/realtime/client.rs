use std::collections::HashMap;
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::Instrument;

use chatline_core::connection::{Connection, ConnectionState, SendDecision};
use chatline_core::debounce::{TypingDebouncer, TypingSignal};
use chatline_core::error::{ChatlineError, Result};
use chatline_core::protocol::{Outbound, OutboundBody, Target};

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::endpoint;
use crate::realtime::handle::{ClientHandle, Outbox};
use crate::realtime::Command;
use crate::transport::{Connector, Incoming, Transport};

/// Snapshot published on every state or queue change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientStatus {
    pub state: ConnectionState,
    pub attempts: u32,
    pub queued: usize,
}

type Attempt<T> = BoxFuture<'static, Result<T>>;

pub struct RealtimeClient<C: Connector> {
    connector: Arc<C>,
    conn: Connection,
    dispatcher: Arc<Dispatcher>,
    endpoint: String,

    typing: HashMap<Target, TypingDebouncer>,
    typing_window: Duration,
    ping_every: Option<Duration>,
    handshake_timeout: Duration,
    idle_timeout: Option<Duration>,
    last_inbound: Instant,

    cmd_rx: mpsc::UnboundedReceiver<Command>,
    status_tx: watch::Sender<ClientStatus>,

    transport: Option<C::Transport>,
    attempt: Option<Attempt<C::Transport>>,
    ping: Option<Interval>,
}

impl<C: Connector> RealtimeClient<C> {
    /// Build the driver and its handle. Nothing connects until
    /// `ClientHandle::connect` is called and `run` is being polled.
    pub fn new(cfg: &ClientConfig, connector: C) -> Result<(Self, ClientHandle)> {
        cfg.validate()?;
        let url = endpoint::resolve(&cfg.endpoint.url, cfg.endpoint.token.as_deref())?;
        let conn = Connection::new(cfg.reconnect.policy(), cfg.queue.build());

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(snapshot(&conn));
        let dispatcher = Arc::new(Dispatcher::new());

        let handle = ClientHandle::new(
            Outbox::new(cmd_tx),
            dispatcher.clone(),
            status_rx,
            url.to_string(),
        );
        let client = Self {
            connector: Arc::new(connector),
            conn,
            dispatcher,
            endpoint: url.to_string(),
            typing: HashMap::new(),
            typing_window: cfg.typing.window(),
            ping_every: cfg.keepalive.interval(),
            handshake_timeout: cfg.reconnect.handshake_timeout(),
            idle_timeout: cfg.keepalive.idle_timeout(),
            last_inbound: Instant::now(),
            cmd_rx,
            status_tx,
            transport: None,
            attempt: None,
            ping: None,
        };
        Ok((client, handle))
    }

    /// Drive the connection until `shutdown`, or until every handle and
    /// outbox is dropped.
    pub async fn run(self) {
        let span = tracing::info_span!("realtime", endpoint = %self.endpoint);
        self.run_loop().instrument(span).await
    }

    async fn run_loop(mut self) {
        loop {
            let reconnect_at = self.conn.reconnect_at().map(Instant::from_std);
            let typing_at = self
                .typing
                .values()
                .filter_map(TypingDebouncer::deadline)
                .min()
                .map(Instant::from_std);
            let idle_at = self
                .idle_timeout
                .filter(|_| self.transport.is_some())
                .map(|limit| self.last_inbound + limit);

            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.on_command(cmd).await,
                },

                res = next_attempt(self.attempt.as_mut()) => {
                    self.attempt = None;
                    self.on_attempt(res).await;
                }

                frame = next_frame(self.transport.as_mut()) => self.on_frame(frame),

                at = sleep_until(reconnect_at) => self.on_reconnect_due(at),

                at = sleep_until(typing_at) => self.on_typing_due(at).await,

                _ = next_tick(self.ping.as_mut()) => self.on_ping().await,

                _ = sleep_until(idle_at) => self.on_idle(),
            }
        }

        if let Some(mut t) = self.transport.take() {
            let _ = t.close().await;
        }
        tracing::info!("realtime client stopped");
    }

    async fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { url } => {
                if self.conn.connect(url) {
                    if let Some(mut old) = self.transport.take() {
                        let _ = old.close().await;
                    }
                    self.ping = None;
                    self.start_attempt();
                }
            }
            Command::Send { msg, reply } => {
                let stop_for = match msg.body() {
                    OutboundBody::ChatMessage { target, .. } => Some(target.clone()),
                    _ => None,
                };
                let res = self.submit(msg).await;
                if let Some(reply) = reply {
                    let _ = reply.send(res);
                } else if let Err(e) = res {
                    tracing::warn!(code = e.kind().as_str(), error = %e, "outbound message refused");
                }
                if let Some(target) = stop_for {
                    self.stop_typing(target).await;
                }
            }
            Command::Keystroke(target) => {
                let now = now();
                let window = self.typing_window;
                let signal = self
                    .typing
                    .entry(target.clone())
                    .or_insert_with(|| TypingDebouncer::new(window))
                    .keystroke(now);
                if signal == Some(TypingSignal::Start) {
                    self.signal_typing(target, true).await;
                }
            }
            Command::StopTyping(target) => self.stop_typing(target).await,
            Command::Close => {
                self.conn.close();
                self.attempt = None;
                self.ping = None;
                self.typing.clear();
                if let Some(mut t) = self.transport.take() {
                    if let Err(e) = t.close().await {
                        tracing::debug!(error = %e, "close handshake failed");
                    }
                }
                tracing::info!(queued = self.conn.queued_len(), "closed by user");
            }
            Command::Shutdown => {}
        }
        self.publish();
    }

    fn start_attempt(&mut self) {
        let Some(url) = self.conn.endpoint().map(str::to_owned) else {
            return;
        };
        tracing::info!(%url, attempt = self.conn.attempts(), "connecting");
        let connector = self.connector.clone();
        let limit = self.handshake_timeout;
        self.attempt = Some(Box::pin(async move {
            match tokio::time::timeout(limit, connector.connect(&url)).await {
                Ok(res) => res,
                Err(_) => Err(ChatlineError::Transport("handshake timed out".into())),
            }
        }));
    }

    async fn on_attempt(&mut self, res: Result<C::Transport>) {
        match res {
            Ok(mut t) => {
                if !self.conn.on_open() {
                    let _ = t.close().await;
                    return;
                }
                tracing::info!(queued = self.conn.queued_len(), "connection open");
                self.transport = Some(t);
                self.last_inbound = Instant::now();
                self.ping = self.ping_every.map(|every| {
                    let mut tick = tokio::time::interval_at(Instant::now() + every, every);
                    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    tick
                });
                self.flush().await;
            }
            Err(e) => self.lose(e),
        }
        self.publish();
    }

    fn on_frame(&mut self, frame: Option<Result<Incoming>>) {
        match frame {
            Some(Ok(Incoming::Text(text))) => {
                self.last_inbound = Instant::now();
                tracing::trace!(%text, "frame in");
                self.dispatcher.dispatch_text(&text);
            }
            Some(Ok(Incoming::Activity)) => {
                self.last_inbound = Instant::now();
                return;
            }
            Some(Err(e)) => self.lose(e),
            None => self.lose(ChatlineError::Transport("closed by server".into())),
        }
        self.publish();
    }

    fn on_reconnect_due(&mut self, fired: Instant) {
        if self.conn.poll_reconnect(due(fired)) {
            self.start_attempt();
            self.publish();
        }
    }

    async fn on_typing_due(&mut self, fired: Instant) {
        let now = due(fired);
        let mut stops = Vec::new();
        for (target, d) in self.typing.iter_mut() {
            if d.poll(now) == Some(TypingSignal::Stop) {
                stops.push(target.clone());
            }
        }
        self.typing.retain(|_, d| d.is_typing());
        for target in stops {
            self.signal_typing(target, false).await;
        }
    }

    async fn on_ping(&mut self) {
        let Some(t) = self.transport.as_mut() else {
            return;
        };
        if let Err(e) = t.ping().await {
            self.lose(e);
            self.publish();
        }
    }

    fn on_idle(&mut self) {
        let silent_ms = self.last_inbound.elapsed().as_millis() as u64;
        tracing::debug!(silent_ms, "no inbound frames within idle timeout");
        self.lose(ChatlineError::Transport("idle timeout".into()));
        self.publish();
    }

    /// Route one message through the state machine.
    async fn submit(&mut self, msg: Outbound) -> Result<()> {
        match self.conn.send(msg)? {
            SendDecision::Transmit(msg) => self.transmit(&msg).await,
            SendDecision::Queued { evicted } => {
                if let Some(old) = evicted {
                    tracing::warn!(kind = old.kind().as_str(), "outbound queue full, dropped oldest");
                }
                tracing::debug!(queued = self.conn.queued_len(), "message queued");
                Ok(())
            }
        }
    }

    /// Single send attempt while Open. A transport failure is not the
    /// caller's error: it moves the connection to Reconnecting.
    async fn transmit(&mut self, msg: &Outbound) -> Result<()> {
        let text = msg.encode()?;
        let Some(t) = self.transport.as_mut() else {
            return Ok(());
        };
        tracing::trace!(%text, "frame out");
        if let Err(e) = t.send(text).await {
            tracing::warn!(kind = msg.kind().as_str(), "message lost with the connection");
            self.lose(e);
        }
        Ok(())
    }

    /// Drain the queue FIFO; the head is only removed once the transport took it.
    async fn flush(&mut self) {
        while let Some(head) = self.conn.next_queued() {
            let text = match head.encode() {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping unencodable queued message");
                    self.conn.ack_queued();
                    continue;
                }
            };
            let Some(t) = self.transport.as_mut() else {
                return;
            };
            match t.send(text).await {
                Ok(()) => {
                    self.conn.ack_queued();
                }
                Err(e) => {
                    self.lose(e);
                    return;
                }
            }
        }
    }

    async fn stop_typing(&mut self, target: Target) {
        let stopped = self
            .typing
            .remove(&target)
            .and_then(|mut d| d.stop())
            .is_some();
        if stopped {
            self.signal_typing(target, false).await;
        }
    }

    /// Typing indicators are only meaningful live; they are never queued.
    async fn signal_typing(&mut self, target: Target, is_typing: bool) {
        if self.conn.state() != ConnectionState::Open {
            tracing::debug!(%target, is_typing, "typing signal dropped while offline");
            return;
        }
        if let Err(e) = self.submit(Outbound::typing(target, is_typing)).await {
            tracing::debug!(error = %e, "typing signal refused");
        }
    }

    fn lose(&mut self, err: ChatlineError) {
        self.transport = None;
        self.attempt = None;
        self.ping = None;
        match self.conn.on_lost(now()) {
            Some(at) => {
                let delay = at.saturating_duration_since(now());
                tracing::warn!(
                    error = %err,
                    attempt = self.conn.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "connection lost, reconnecting"
                );
            }
            None => tracing::debug!(error = %err, "connection lost after close"),
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(snapshot(&self.conn));
    }
}

fn snapshot(conn: &Connection) -> ClientStatus {
    ClientStatus {
        state: conn.state(),
        attempts: conn.attempts(),
        queued: conn.queued_len(),
    }
}

/// Current time on the tokio clock, so paused-time tests drive the sans-IO core.
fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// A timer that fired is due even if the clock reads a hair before its deadline.
fn due(fired: Instant) -> std::time::Instant {
    now().max(fired.into_std())
}

async fn next_attempt<T>(attempt: Option<&mut Attempt<T>>) -> Result<T> {
    match attempt {
        Some(fut) => fut.await,
        None => pending().await,
    }
}

async fn next_frame<T: Transport>(transport: Option<&mut T>) -> Option<Result<Incoming>> {
    match transport {
        Some(t) => t.recv().await,
        None => pending().await,
    }
}

/// Resolves with the deadline once it passed.
async fn sleep_until(at: Option<Instant>) -> Instant {
    match at {
        Some(at) => {
            tokio::time::sleep_until(at).await;
            at
        }
        None => pending().await,
    }
}

async fn next_tick(tick: Option<&mut Interval>) {
    match tick {
        Some(tick) => {
            tick.tick().await;
        }
        None => pending().await,
    }
}
