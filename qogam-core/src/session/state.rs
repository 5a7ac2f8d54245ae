use crate::auth::User;

/// Number of digits in a confirmation code.
pub const OTP_LENGTH: usize = 4;

/// Where the user is in the verification lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum)]
pub enum SessionPhase {
    /// No token and no code requested.
    #[default]
    Anonymous,
    /// A code was sent to `pending_phone`; waiting for it to be entered.
    CodeRequested,
    /// A token is held.
    Authenticated,
}

/// Snapshot of the session as rendered by the screens.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct SessionState {
    /// The authenticated user. Absent after a registration until it is fetched.
    pub user: Option<User>,
    /// Bearer token; present exactly when the session is authenticated.
    pub token: Option<String>,
    /// Phone being verified, digits only, calling code first.
    pub pending_phone: String,
    /// Exactly [`OTP_LENGTH`] slots, each a single digit or empty.
    pub otp_digits: Vec<String>,
    /// Seconds until another code may be requested.
    pub resend_countdown: u32,
    /// A send or verify call is outstanding.
    pub is_busy: bool,
    /// Description of the last failure.
    pub last_error: Option<String>,
    /// Lifecycle phase.
    pub phase: SessionPhase,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            pending_phone: String::new(),
            otp_digits: empty_otp_digits(),
            resend_countdown: 0,
            is_busy: false,
            last_error: None,
            phase: SessionPhase::Anonymous,
        }
    }
}

impl SessionState {
    /// Whether a token is held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The entered code: non-empty slots concatenated in order.
    #[must_use]
    pub fn otp_code(&self) -> String {
        self.otp_digits.concat()
    }

    /// Whether a new code may be requested.
    #[must_use]
    pub const fn can_resend(&self) -> bool {
        self.resend_countdown == 0
    }

    pub(crate) fn clear_otp(&mut self) {
        self.otp_digits = empty_otp_digits();
    }
}

/// Partial update staged by the screens. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct SessionUpdate {
    /// New phone; normalized to digits before it is stored.
    pub pending_phone: Option<String>,
    /// New code slots; coerced to [`OTP_LENGTH`] single-digit slots.
    pub otp_digits: Option<Vec<String>>,
}

pub(crate) fn empty_otp_digits() -> Vec<String> {
    vec![String::new(); OTP_LENGTH]
}

/// Keeps the first digit of each slot, pads or truncates to [`OTP_LENGTH`].
pub(crate) fn normalize_otp_digits(digits: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = digits
        .iter()
        .take(OTP_LENGTH)
        .map(|slot| first_digit(slot))
        .collect();
    normalized.resize(OTP_LENGTH, String::new());
    normalized
}

pub(crate) fn first_digit(value: &str) -> String {
    value
        .chars()
        .find(char::is_ascii_digit)
        .map(String::from)
        .unwrap_or_default()
}
