//! Content-addressed naming for anonymous handlers.
//!
//! Scripts may bind an inline closure instead of a named function. To
//! unbind it later — possibly without retaining the original value — the
//! bridge gives every anonymous callable a stable synthetic name derived
//! from its canonical serialized form (source text, bytecode, or the
//! engine's own deterministic rendering):
//!
//! ```text
//! bind("irc.message", function(e) ... end)
//!             │
//!             ▼ canonical rendering (per registrar)
//! "\x1bLua..."  ──UUID v5──►  __Handler91c3b2a7f04e5d18c6a20b9e4f7d3a55
//! ```
//!
//! Properties the scheme guarantees:
//!
//! - the same anonymous literal text always yields the same name, within
//!   and across process runs;
//! - the name is fixed width (marker + 32 hex digits);
//! - the marker prefix cannot collide with a user-chosen identifier that
//!   lacks it.
//!
//! The digest is a UUID v5 (SHA-1) under a namespace reserved for handler
//! identity, the same deterministic-naming device used for ids elsewhere
//! in the ecosystem.

use uuid::{uuid, Uuid};

/// Marker prefix reserved for synthetic handler names.
pub const HANDLER_MARKER: &str = "__Handler";

/// Namespace under which handler digests are computed.
const HANDLER_NAMESPACE: Uuid = uuid!("a9c8b4de-51f0-4f3e-9d26-8f4b2d7e6c11");

/// Computes the synthetic handler name for a canonical textual rendering.
#[must_use]
pub fn synthetic_name(canonical: &str) -> String {
    synthetic_name_from_bytes(canonical.as_bytes())
}

/// Computes the synthetic handler name for a canonical byte rendering.
///
/// Used by registrars whose canonical form is not text (e.g. Lua bytecode
/// dumps).
#[must_use]
pub fn synthetic_name_from_bytes(canonical: &[u8]) -> String {
    let digest = Uuid::new_v5(&HANDLER_NAMESPACE, canonical);
    format!("{HANDLER_MARKER}{}", digest.simple())
}

/// Returns `true` if `name` carries the synthetic-handler marker.
#[must_use]
pub fn is_synthetic(name: &str) -> bool {
    name.starts_with(HANDLER_MARKER)
}
