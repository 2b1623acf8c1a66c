//! Binding table and pending-event queue.

use argot_types::{EventType, Language, ScriptMap};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// One event subscription: a handler name owned by one language, bound to
/// one event type.
///
/// Handler names are unique per `(language, event)` pair; the bus enforces
/// this by making duplicate binds idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBinding {
    /// The language whose runtime owns the handler.
    pub language: Language,
    /// The event type subscribed to.
    pub event: EventType,
    /// The handler's name inside its interpreter (user-chosen or
    /// synthetic, see `argot_types::identity`).
    pub handler: String,
}

/// A triggered event waiting for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    /// The event type that was triggered.
    pub event: EventType,
    /// The normalized payload — never absent, possibly empty.
    pub payload: ScriptMap,
}

#[derive(Default)]
struct BusState {
    /// All bindings in global insertion order. The set stays small (a
    /// handful of handlers per bot), so membership checks scan linearly
    /// and keep one unambiguous ordering for cross-language fan-out.
    bindings: Vec<EventBinding>,
    /// Triggered events not yet dispatched, FIFO.
    queue: VecDeque<PendingEvent>,
}

/// Shared event-subscription registry and trigger queue.
///
/// See the crate docs for the dispatch model. All methods take `&self`;
/// the bus is meant to live in an `Arc` captured by every registrar.
#[derive(Default)]
pub struct EventBus {
    state: Mutex<BusState>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding. Idempotent: binding an identical
    /// `(language, event, handler)` triple again changes nothing.
    ///
    /// Returns `true` if the binding was new.
    pub fn bind(&self, language: Language, event: EventType, handler: impl Into<String>) -> bool {
        let handler = handler.into();
        let mut state = self.state.lock();
        let exists = state
            .bindings
            .iter()
            .any(|b| b.language == language && b.event == event && b.handler == handler);
        if exists {
            debug!(%language, %event, %handler, "bind: already bound");
            return false;
        }
        debug!(%language, %event, %handler, "bind");
        state.bindings.push(EventBinding {
            language,
            event,
            handler,
        });
        true
    }

    /// Removes a binding if present. Unbinding an absent binding is a
    /// no-op, not an error.
    pub fn unbind(&self, language: Language, event: &EventType, handler: &str) {
        let mut state = self.state.lock();
        let before = state.bindings.len();
        state
            .bindings
            .retain(|b| !(b.language == language && &b.event == event && b.handler == handler));
        if state.bindings.len() != before {
            debug!(%language, %event, handler, "unbind");
        }
    }

    /// Returns every `(language, handler)` bound to `event`, in bind order.
    #[must_use]
    pub fn handlers(&self, event: &EventType) -> Vec<(Language, String)> {
        self.state
            .lock()
            .bindings
            .iter()
            .filter(|b| &b.event == event)
            .map(|b| (b.language, b.handler.clone()))
            .collect()
    }

    /// Returns the total number of bindings across all events.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.state.lock().bindings.len()
    }

    /// Drops every binding owned by `language`.
    ///
    /// Called when that language's interpreter is discarded: no binding
    /// survives interpreter teardown.
    pub fn clear_language(&self, language: Language) {
        let mut state = self.state.lock();
        let before = state.bindings.len();
        state.bindings.retain(|b| b.language != language);
        let dropped = before - state.bindings.len();
        if dropped > 0 {
            debug!(%language, dropped, "cleared bindings for discarded runtime");
        }
    }

    /// Queues an event for dispatch.
    ///
    /// An absent payload normalizes to an empty mapping here, at the one
    /// choke point every trigger passes through — handlers never see a
    /// null payload.
    pub fn enqueue(&self, event: EventType, payload: Option<ScriptMap>) {
        let payload = payload.unwrap_or_default();
        debug!(%event, fields = payload.len(), "trigger enqueued");
        self.state.lock().queue.push_back(PendingEvent { event, payload });
    }

    /// Takes the oldest pending event, if any.
    pub fn dequeue(&self) -> Option<PendingEvent> {
        self.state.lock().queue.pop_front()
    }

    /// Returns the number of events waiting for dispatch.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.lock().queue.len()
    }
}
