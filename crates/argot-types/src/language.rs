//! Language and event-type tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The embedded script languages the bridge knows about.
///
/// This is a closed set: every [`EventBinding`] and every dispatch is
/// tagged with exactly one of these, and the `ScriptManager` routes by it.
///
/// [`EventBinding`]: https://docs.rs/argot-event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Lua 5.4 via `mlua`.
    Lua,
    /// JavaScript via `rquickjs`.
    JavaScript,
    /// Rhai via `rhai`.
    Rhai,
    /// Ketos (a Lisp dialect) via `ketos`.
    Lisp,
}

impl Language {
    /// All embedded languages, in registration order.
    pub const ALL: [Language; 4] = [
        Language::Lua,
        Language::JavaScript,
        Language::Rhai,
        Language::Lisp,
    ];

    /// Returns the lowercase tag used in logs and configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lua => "lua",
            Self::JavaScript => "javascript",
            Self::Rhai => "rhai",
            Self::Lisp => "lisp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string tag classifying triggerable occurrences.
///
/// Event types are free-form; the host picks a vocabulary (e.g.
/// `irc.message`, `irc.connect`) and scripts bind against it. Two event
/// types are the same binding key iff their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventType(String);

impl EventType {
    /// Creates an event type from any string-ish value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags() {
        assert_eq!(Language::Lua.as_str(), "lua");
        assert_eq!(Language::JavaScript.to_string(), "javascript");
        assert_eq!(Language::ALL.len(), 4);
    }

    #[test]
    fn event_type_equality() {
        assert_eq!(EventType::from("irc.message"), "irc.message".into());
        assert_ne!(EventType::from("irc.message"), EventType::from("irc.join"));
    }

    #[test]
    fn event_type_serde_is_transparent_enough() {
        let ev = EventType::from("irc.message");
        let json = serde_json::to_string(&ev).unwrap();
        let back: EventType = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
