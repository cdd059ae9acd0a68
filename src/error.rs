//! Shared error conventions.
//!
//! Every error enum in the crate implements [`ErrorCode`] so surfaces can log
//! or display a stable grepable code alongside the human message.

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same operation could plausibly succeed.
    ///
    /// Informational only: nothing in the crate retries automatically.
    fn retryable(&self) -> bool {
        false
    }
}

/// Render an error as `"<CODE>: <message>"`.
pub fn describe(err: &(impl ErrorCode + ?Sized)) -> String {
    format!("{}: {err}", err.error_code())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
