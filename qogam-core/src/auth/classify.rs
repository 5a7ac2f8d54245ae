use crate::error::QogamError;

/// Substrings of backend messages that mean "no account for this phone".
///
/// The backend reports a missing account only in prose (`Пользователь не найден`), so the
/// login-vs-registration decision hinges on these. Matching is case-sensitive.
pub const USER_NOT_FOUND_MARKERS: [&str; 3] = ["не найден", "not found", "Пользователь"];

/// How a failed credential call should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The phone has no account: retry through the registration endpoint.
    UserNotFound,
    /// Anything else: surface the error.
    Other,
}

/// Classifies a failed login call.
///
/// Only messages that came from the backend are inspected; transport errors, timeouts and local
/// failures are always [`FailureKind::Other`].
#[must_use]
pub fn classify_failure(error: &QogamError) -> FailureKind {
    match error.server_message() {
        Some(message)
            if USER_NOT_FOUND_MARKERS
                .iter()
                .any(|marker| message.contains(marker)) =>
        {
            FailureKind::UserNotFound
        }
        _ => FailureKind::Other,
    }
}
