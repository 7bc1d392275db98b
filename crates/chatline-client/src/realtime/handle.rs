use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use chatline_core::error::{ChatlineError, Result};
use chatline_core::protocol::{InboundKind, Outbound, Target, UserId};

use crate::dispatch::{Dispatcher, InboundHandler};
use crate::realtime::client::ClientStatus;
use crate::realtime::Command;

/// Outcome of one `send`, resolved by the driver once the message was either
/// handed to the transport or queued.
#[derive(Debug)]
pub struct SendTicket {
    rx: oneshot::Receiver<Result<()>>,
}

impl SendTicket {
    /// `QueueFull` under the `reject` overflow policy, `ClientGone` if the
    /// driver stopped before routing the message.
    pub async fn outcome(self) -> Result<()> {
        self.rx.await.unwrap_or(Err(ChatlineError::ClientGone))
    }
}

/// Send-only side of the handle.
///
/// Holds no reference to the handler registry, so handlers can capture it.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<Command>,
}

impl Outbox {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    pub(crate) fn command(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).map_err(|_| ChatlineError::ClientGone)
    }

    pub fn send(&self, msg: Outbound) -> Result<SendTicket> {
        let (reply, rx) = oneshot::channel();
        self.command(Command::Send {
            msg,
            reply: Some(reply),
        })?;
        Ok(SendTicket { rx })
    }

    /// Send without waiting for the routing outcome.
    pub fn post(&self, msg: Outbound) -> Result<()> {
        self.command(Command::Send { msg, reply: None })
    }
}

#[derive(Clone)]
pub struct ClientHandle {
    outbox: Outbox,
    dispatcher: Arc<Dispatcher>,
    status: watch::Receiver<ClientStatus>,
    endpoint: String,
}

impl ClientHandle {
    pub(crate) fn new(
        outbox: Outbox,
        dispatcher: Arc<Dispatcher>,
        status: watch::Receiver<ClientStatus>,
        endpoint: String,
    ) -> Self {
        Self {
            outbox,
            dispatcher,
            status,
            endpoint,
        }
    }

    /// Default endpoint resolved from config.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Connect to the configured endpoint.
    pub fn connect(&self) -> Result<()> {
        self.connect_to(self.endpoint.clone())
    }

    /// Connect to `url`. Transport failures are never reported here; they
    /// show up as `Reconnecting` in the status feed.
    pub fn connect_to(&self, url: impl Into<String>) -> Result<()> {
        self.outbox.command(Command::Connect { url: url.into() })
    }

    pub fn send(&self, msg: Outbound) -> Result<SendTicket> {
        self.outbox.send(msg)
    }

    /// Validate and send a chat message. A blank body fails with
    /// `EmptyMessage` before anything reaches the driver.
    pub fn send_chat(&self, target: Target, text: &str) -> Result<SendTicket> {
        self.send(Outbound::chat(target, text)?)
    }

    pub fn keystroke(&self, target: Target) -> Result<()> {
        self.outbox.command(Command::Keystroke(target))
    }

    pub fn stop_typing(&self, target: Target) -> Result<()> {
        self.outbox.command(Command::StopTyping(target))
    }

    pub fn join_room(&self, room: impl Into<String>) -> Result<SendTicket> {
        self.send(Outbound::join_room(room))
    }

    pub fn mark_read(&self, sender_id: UserId) -> Result<SendTicket> {
        self.send(Outbound::read_receipt(sender_id))
    }

    /// User-initiated disconnect; no reconnect until the next `connect`.
    pub fn close(&self) -> Result<()> {
        self.outbox.command(Command::Close)
    }

    /// Stop the driver task.
    pub fn shutdown(&self) -> Result<()> {
        self.outbox.command(Command::Shutdown)
    }

    /// Register the handler for `kind`, returning the one it replaced.
    pub fn on_message<H>(&self, kind: InboundKind, handler: H) -> Option<Arc<dyn InboundHandler>>
    where
        H: InboundHandler + 'static,
    {
        self.dispatcher.register(kind, Arc::new(handler))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn status(&self) -> ClientStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ClientStatus> {
        self.status.clone()
    }
}
