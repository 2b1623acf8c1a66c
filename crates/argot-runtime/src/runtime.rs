//! The registrar seam.

use argot_types::{Language, ScriptMap};

use crate::RuntimeError;

/// One embedded interpreter, adapted to the bridge.
///
/// A registrar implementing this trait owns its interpreter instance and
/// the language-specific glue (value marshaling, identity rendering and
/// alias registration, native error conversion). All cross-cutting logic
/// — the binding table, handler identity digests, store semantics — is
/// delegated to the shared components; none of it may be re-implemented
/// per language.
///
/// # Execution model
///
/// Runtimes are driven only by the `ScriptManager`, one call at a time.
/// An interpreter is never invoked re-entrantly: script code that calls
/// `trigger` merely enqueues, and the manager dispatches after the
/// current call returns. Implementations therefore need no internal
/// locking around their interpreter state.
pub trait ScriptRuntime {
    /// The language this runtime embeds.
    fn language(&self) -> Language;

    /// Parses and executes a source chunk in the interpreter's global
    /// scope (loading handler definitions, running top-level code).
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Eval`] with the interpreter's message.
    fn eval(&mut self, source: &str) -> Result<(), RuntimeError>;

    /// Invokes the named handler with an event payload.
    ///
    /// `handler` is either a user-chosen global name or a synthetic alias
    /// registered at bind time (see `argot_types::identity`). The payload
    /// is marshaled into the interpreter's native mapping shape.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::HandlerNotFound`] if the name resolves to nothing
    /// invokable; [`RuntimeError::Dispatch`] if the handler itself fails.
    fn dispatch(&mut self, handler: &str, payload: &ScriptMap) -> Result<(), RuntimeError>;
}
