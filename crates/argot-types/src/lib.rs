//! Core types for the argot scripting bridge.
//!
//! This crate is the bottom layer of the argot workspace: every other
//! crate depends on it and it depends on nothing else in the workspace.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  argot-app        : assembly, integration tests             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  argot-lua / -js / -rhai / -lisp : runtime registrars       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  argot-runtime    : ScriptManager, collaborator traits      │
//! │  argot-event      : EventBus                                │
//! │  argot-store      : document store adapter                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  argot-types      : value model, identity, errors ◄── HERE  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Contents
//!
//! - [`ScriptValue`] / [`ScriptMap`] — the common intermediate value model
//!   every embedded interpreter marshals through. No interpreter's native
//!   type ever crosses into another interpreter.
//! - [`Language`] — the closed set of embedded languages.
//! - [`EventType`] — string tag classifying triggerable occurrences.
//! - [`identity`] — content-addressed naming for anonymous handlers.
//! - [`ErrorCode`] — unified error-code interface implemented by every
//!   error enum in the workspace.
//!
//! # Example
//!
//! ```
//! use argot_types::{EventType, Language, ScriptValue, ScriptMap};
//!
//! let event = EventType::from("irc.message");
//! assert_eq!(event.as_str(), "irc.message");
//!
//! let mut payload = ScriptMap::new();
//! payload.insert("nick".into(), ScriptValue::from("rex"));
//! payload.insert("count".into(), ScriptValue::Int(3));
//! assert_eq!(Language::Lua.as_str(), "lua");
//! ```

mod error;
pub mod identity;
mod language;
mod value;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use language::{EventType, Language};
pub use value::{MarshalError, ScriptMap, ScriptValue};
