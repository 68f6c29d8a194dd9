//! Shared error reporting
//!
//! Errors from every subsystem implement [`ContextualError`] so the top level
//! can decide whether to show the error's own text or a generic context line.

/// Errors that know whether their message is meant for the person at the scanner
///
/// When `is_user_actionable()` is true, `user_message()` must return
/// `Some`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// True when the message tells the user what to fix (bad config value,
    /// rejected badge). False for transport and internal failures.
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error with the right amount of detail
///
/// User-actionable errors print their own message. Everything else prints
/// `operation_context`, with the full error only at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message().filter(|_| error.is_user_actionable()) {
        Some(user_msg) => log::error!("FATAL: {}", user_msg),
        None => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
