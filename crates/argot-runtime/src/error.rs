//! Runtime-layer errors.

use argot_types::{ErrorCode, Language};
use thiserror::Error;

/// Errors crossing the manager/registrar seam.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A registrar failed to set up its interpreter.
    #[error("{language} runtime init failed: {message}")]
    Init {
        /// The language being set up.
        language: Language,
        /// The interpreter's own error rendering.
        message: String,
    },

    /// A source chunk failed to parse or execute.
    #[error("{language} eval failed: {message}")]
    Eval {
        /// The language whose interpreter rejected the source.
        language: Language,
        /// The interpreter's own error rendering.
        message: String,
    },

    /// A handler invocation failed during dispatch.
    #[error("{language} handler '{handler}' failed: {message}")]
    Dispatch {
        /// The language that owns the handler.
        language: Language,
        /// The handler name that was invoked.
        handler: String,
        /// The interpreter's own error rendering.
        message: String,
    },

    /// Dispatch named a handler the interpreter cannot resolve.
    #[error("{language} has no invokable named '{handler}'")]
    HandlerNotFound {
        /// The language searched.
        language: Language,
        /// The unresolved name.
        handler: String,
    },

    /// No runtime is registered for the requested language.
    #[error("no runtime registered for {0}")]
    LanguageUnavailable(Language),
}

impl ErrorCode for RuntimeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Init { .. } => "RUNTIME_INIT",
            Self::Eval { .. } => "RUNTIME_EVAL",
            Self::Dispatch { .. } => "RUNTIME_DISPATCH",
            Self::HandlerNotFound { .. } => "RUNTIME_HANDLER_NOT_FOUND",
            Self::LanguageUnavailable(_) => "RUNTIME_LANGUAGE_UNAVAILABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Re-running the same script or dispatch fails the same way;
        // a missing runtime needs host wiring, not a retry.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argot_types::assert_error_codes;

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                RuntimeError::Init {
                    language: Language::Lua,
                    message: "no vm".into(),
                },
                RuntimeError::Eval {
                    language: Language::Lua,
                    message: "syntax".into(),
                },
                RuntimeError::Dispatch {
                    language: Language::Rhai,
                    handler: "on_msg".into(),
                    message: "boom".into(),
                },
                RuntimeError::HandlerNotFound {
                    language: Language::JavaScript,
                    handler: "ghost".into(),
                },
                RuntimeError::LanguageUnavailable(Language::Lisp),
            ],
            "RUNTIME_",
        );
    }
}
