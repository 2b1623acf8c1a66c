//! Store error taxonomy.

use argot_types::ErrorCode;
use thiserror::Error;

/// Errors from the document store adapter or a backend.
///
/// All of these propagate to the calling script as that language's native
/// error value; there is no automatic retry.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A document id was not an integer (or integral float).
    #[error("invalid document id: expected integer, got {0}")]
    InvalidId(&'static str),

    /// A query predicate had a shape the backend does not understand.
    #[error("invalid query predicate: {0}")]
    Predicate(String),

    /// An update referenced an id with no existing document.
    #[error("no document with id {0}")]
    Missing(i64),

    /// Backend-specific failure (bad collection name, storage fault).
    #[error("store backend error: {0}")]
    Backend(String),

    /// Filesystem failure in a file-backed store.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    /// (De)serialization failure in a file-backed store.
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidId(_) => "STORE_INVALID_ID",
            Self::Predicate(_) => "STORE_PREDICATE",
            Self::Missing(_) => "STORE_MISSING",
            Self::Backend(_) => "STORE_BACKEND",
            Self::Io(_) => "STORE_IO",
            Self::Serialize(_) => "STORE_SERIALIZE",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // A script can save first, or fix the id it passes.
            Self::Missing(_) => true,
            // Transient filesystem conditions can clear up.
            Self::Io(_) => true,
            Self::InvalidId(_) | Self::Predicate(_) | Self::Backend(_) | Self::Serialize(_) => {
                false
            }
        }
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
                StoreError::InvalidId("string"),
                StoreError::Predicate("not a map".into()),
                StoreError::Missing(4),
                StoreError::Backend("boom".into()),
            ],
            "STORE_",
        );
    }
}
