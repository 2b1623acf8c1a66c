//! Unified error-code interface.
//!
//! Every error enum in the argot workspace implements [`ErrorCode`] so the
//! manager and the registrars can log and classify failures uniformly
//! without downcasting.

/// Machine-readable error classification.
///
/// # Code format
///
/// - `UPPER_SNAKE_CASE`, prefixed with the owning domain
///   (`MARSHAL_`, `EVENT_`, `STORE_`, `RUNTIME_`, `HTTP_`);
/// - stable once defined — codes are an API contract.
///
/// # Recoverability
///
/// `is_recoverable` answers "could retrying or user action succeed?":
/// a store miss or an HTTP status is recoverable; a marshaling failure or
/// an invalid handler reference is not.
pub trait ErrorCode {
    /// Returns the machine-readable code for this error.
    fn code(&self) -> &'static str;

    /// Returns whether retrying or corrective action may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows workspace conventions.
///
/// # Panics
///
/// Panics if the code is empty, lacks the expected prefix, or is not
/// `UPPER_SNAKE_CASE`.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();
    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Asserts conventions for every variant of an error enum at once.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
