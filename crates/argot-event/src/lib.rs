//! Event bus for the argot scripting bridge.
//!
//! The [`EventBus`] is the single shared registry of event subscriptions
//! across every embedded language, and the queue through which all
//! triggers flow.
//!
//! # Event flow
//!
//! ```text
//!  host event            script calls trigger(...)
//!      │                          │
//!      ▼                          ▼
//! ┌──────────────────────────────────────────┐
//! │                EventBus                  │
//! │   bindings: (language, event, handler)   │
//! │   queue:    pending (event, payload)     │
//! └──────────────────────────────────────────┘
//!                     │ drained by ScriptManager
//!                     ▼
//!        dispatch(handler, payload) per binding,
//!        in bind order, one language at a time
//! ```
//!
//! Scripts never invoke each other directly: a `trigger` from inside a
//! handler only **enqueues**. The manager's drain loop is the only code
//! that calls into an interpreter, so re-entrant interpreter invocation
//! cannot happen, while nested triggers are still delivered (after the
//! current event's fan-out completes).
//!
//! # Sharing
//!
//! One `EventBus` is shared by every registrar and the manager via `Arc`.
//! Interior state sits behind a [`parking_lot::Mutex`]; critical sections
//! are short and no lock is held across an interpreter call.

mod bus;

pub use bus::{EventBinding, EventBus, PendingEvent};
