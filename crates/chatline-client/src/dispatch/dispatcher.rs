use std::sync::Arc;

use dashmap::DashMap;

use chatline_core::error::ChatlineError;
use chatline_core::protocol::{decode_inbound, Inbound, InboundKind};

/// Handler for one inbound kind.
///
/// Runs on the driver task between two socket reads, so it must not block.
pub trait InboundHandler: Send + Sync {
    fn handle(&self, msg: &Inbound);
}

impl<F> InboundHandler for F
where
    F: Fn(&Inbound) + Send + Sync,
{
    fn handle(&self, msg: &Inbound) {
        self(msg)
    }
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled(InboundKind),
    Unhandled(InboundKind),
    /// Malformed or unknown frame; dropped.
    Discarded,
}

/// Kind -> handler registry. At most one handler per kind.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<InboundKind, Arc<dyn InboundHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Register `handler` for `kind`, returning the handler it replaced.
    pub fn register(
        &self,
        kind: InboundKind,
        handler: Arc<dyn InboundHandler>,
    ) -> Option<Arc<dyn InboundHandler>> {
        self.handlers.insert(kind, handler)
    }

    pub fn unregister(&self, kind: InboundKind) -> Option<Arc<dyn InboundHandler>> {
        self.handlers.remove(&kind).map(|(_, h)| h)
    }

    pub fn registered_kinds(&self) -> Vec<InboundKind> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    pub fn dispatch(&self, msg: &Inbound) -> DispatchOutcome {
        let kind = msg.kind();
        // clone out so a handler may register/unregister without deadlocking the shard
        let handler = match self.handlers.get(&kind) {
            Some(h) => h.value().clone(),
            None => {
                tracing::debug!(%kind, "no handler registered");
                return DispatchOutcome::Unhandled(kind);
            }
        };
        handler.handle(msg);
        DispatchOutcome::Handled(kind)
    }

    /// Decode one text frame and dispatch it. Never fails: bad frames are
    /// logged and discarded.
    pub fn dispatch_text(&self, text: &str) -> DispatchOutcome {
        match decode_inbound(text) {
            Ok(msg) => self.dispatch(&msg),
            Err(e @ ChatlineError::UnknownKind(_)) => {
                tracing::debug!(code = e.kind().as_str(), error = %e, "frame discarded");
                DispatchOutcome::Discarded
            }
            Err(e) => {
                tracing::warn!(code = e.kind().as_str(), error = %e, "frame discarded");
                DispatchOutcome::Discarded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, Arc<dyn InboundHandler>) {
        let n = Arc::new(AtomicUsize::new(0));
        let c = n.clone();
        let h: Arc<dyn InboundHandler> = Arc::new(move |_: &Inbound| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (n, h)
    }

    const READ: &str = r#"{"type":"messages_read","reader_id":2}"#;

    #[test]
    fn second_registration_replaces_first() {
        let d = Dispatcher::new();
        let (first, h1) = counter();
        let (second, h2) = counter();

        assert!(d.register(InboundKind::MessagesRead, h1).is_none());
        assert!(d.register(InboundKind::MessagesRead, h2).is_some());

        assert_eq!(d.dispatch_text(READ), DispatchOutcome::Handled(InboundKind::MessagesRead));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn malformed_and_unknown_frames_reach_no_handler() {
        let d = Dispatcher::new();
        let (n, h) = counter();
        for kind in InboundKind::ALL {
            d.register(kind, h.clone());
        }

        assert_eq!(d.dispatch_text("{not json"), DispatchOutcome::Discarded);
        assert_eq!(d.dispatch_text(r#"{"type":"bogus"}"#), DispatchOutcome::Discarded);
        assert_eq!(d.dispatch_text(r#"{"type":"messages_read"}"#), DispatchOutcome::Discarded);
        assert_eq!(n.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unregistered_kind_is_unhandled() {
        let d = Dispatcher::new();
        assert_eq!(d.dispatch_text(READ), DispatchOutcome::Unhandled(InboundKind::MessagesRead));

        let (_, h) = counter();
        d.register(InboundKind::MessagesRead, h);
        assert!(d.unregister(InboundKind::MessagesRead).is_some());
        assert!(d.registered_kinds().is_empty());
    }
}
