use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{futures::Notified, watch, Notify};

use crate::{
    auth::{classify_failure, AuthApi, AuthFlow, FailureKind, User},
    error::QogamError,
    phone::{clean_phone_number, is_normalized},
    store::{KeyValueStore, AUTH_PHONE_KEY, AUTH_TOKEN_KEY, AUTH_USER_KEY, SESSION_KEYS},
    ClientConfig,
};

use super::{
    cell::SessionCell,
    countdown::Countdown,
    observer::SessionObserver,
    state::{first_digit, normalize_otp_digits, SessionPhase, SessionState, SessionUpdate, OTP_LENGTH},
};

/// Why an operation was not started. No state changed and no request was made.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum Precondition {
    /// No phone has been entered.
    MissingPhone,
    /// The staged phone is not a digit string.
    InvalidPhone,
    /// Another send or verify call is outstanding.
    Busy,
    /// A code was sent recently; wait for the countdown.
    ResendCooldown {
        /// Seconds left on the countdown.
        remaining_secs: u32,
    },
    /// Fewer than four digits entered.
    IncompleteCode,
}

/// Result of [`SessionController::request_code`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum RequestCodeOutcome {
    /// A code is on its way; show the confirmation step.
    CodeSent {
        /// Endpoint family that accepted the phone.
        flow: AuthFlow,
    },
    /// Not attempted.
    Ignored {
        /// The unmet precondition.
        reason: Precondition,
    },
    /// Both attempts failed, or the failure was not a missing account. Also in `last_error`.
    Failed {
        /// Human-readable description.
        message: String,
    },
    /// Cancelled by [`SessionController::cancel`] or a logout.
    Cancelled,
}

/// Result of [`SessionController::submit_code`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum SubmitCodeOutcome {
    /// A token is held; show the authenticated area.
    Authenticated {
        /// Endpoint family that confirmed the code.
        flow: AuthFlow,
    },
    /// Not attempted.
    Ignored {
        /// The unmet precondition.
        reason: Precondition,
    },
    /// Verification failed; the code slots were cleared. Also in `last_error`.
    Failed {
        /// Human-readable description.
        message: String,
    },
    /// Cancelled by [`SessionController::cancel`] or a logout.
    Cancelled,
}

struct Confirmed {
    flow: AuthFlow,
    token: String,
    user: Option<User>,
}

/// Owns the session: phone verification with login-then-registration fallback, the resend
/// countdown, and persistence of the result.
///
/// At most one send/verify call is outstanding at a time; callers that race are answered with
/// [`Precondition::Busy`].
#[derive(uniffi::Object)]
pub struct SessionController {
    config: ClientConfig,
    api: AuthApi,
    store: Arc<dyn KeyValueStore>,
    cell: Arc<SessionCell>,
    countdown: Countdown,
    cancel: Notify,
    /// Bumped by `logout`; results of operations started in an older epoch are dropped.
    epoch: AtomicU64,
    /// Held while an operation result is committed and while `logout` clears the session.
    commit: Mutex<()>,
}

#[uniffi::export(async_runtime = "tokio")]
impl SessionController {
    /// Creates a controller and restores the session persisted in `store`.
    ///
    /// A stored token restores an authenticated session; otherwise a stored phone resumes the
    /// confirmation step of an interrupted flow.
    ///
    /// # Errors
    /// Returns an error if `config` is invalid. Unreadable store entries are logged and skipped.
    #[uniffi::constructor]
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Arc<Self>, QogamError> {
        config.validate()?;
        let initial = hydrate(store.as_ref());
        tracing::info!(phase = ?initial.phase, "session restored");
        Ok(Arc::new(Self {
            api: AuthApi::new(&config),
            config,
            store,
            cell: Arc::new(SessionCell::new(initial)),
            countdown: Countdown::default(),
            cancel: Notify::new(),
            epoch: AtomicU64::new(0),
            commit: Mutex::new(()),
        }))
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.cell.snapshot()
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.cell.snapshot().is_authenticated()
    }

    /// Registers the observer notified on every state change, replacing any previous one.
    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.cell.set_observer(Some(observer));
    }

    /// Removes the registered observer.
    pub fn clear_observer(&self) {
        self.cell.set_observer(None);
    }

    /// Stages screen input. The phone is normalized to digits and persisted when it changes, so
    /// an interrupted flow can resume after a restart. Clearing the phone forgets it.
    #[allow(clippy::needless_pass_by_value)]
    pub fn update(&self, update: SessionUpdate) {
        let mut changed_phone = None;
        self.cell.modify(|state| {
            let mut changed = false;
            if let Some(phone) = update.pending_phone {
                let phone = clean_phone_number(&phone);
                if phone != state.pending_phone {
                    changed_phone = Some(phone.clone());
                    state.pending_phone = phone;
                    changed = true;
                }
            }
            if let Some(digits) = update.otp_digits {
                let digits = normalize_otp_digits(&digits);
                if digits != state.otp_digits {
                    state.otp_digits = digits;
                    changed = true;
                }
            }
            changed
        });

        let persisted = match changed_phone {
            Some(phone) if phone.is_empty() => self.store.remove(AUTH_PHONE_KEY.to_string()),
            Some(phone) => self.store.set(AUTH_PHONE_KEY.to_string(), phone),
            None => Ok(()),
        };
        if let Err(err) = persisted {
            tracing::error!(%err, "failed to persist pending phone");
        }
    }

    /// Sets one code slot (0-based). Out-of-range indices are ignored; only the first digit of
    /// `value` is kept.
    #[allow(clippy::needless_pass_by_value)]
    pub fn set_otp_digit(&self, index: u32, value: String) {
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        if index >= OTP_LENGTH {
            tracing::debug!(index, "otp slot out of range");
            return;
        }
        let digit = first_digit(&value);
        self.cell.modify(|state| {
            if state.otp_digits[index] == digit {
                return false;
            }
            state.otp_digits[index] = digit;
            true
        });
    }

    /// Requests a code for `pending_phone`: login first, registration if the backend reports
    /// no account for the phone.
    pub async fn request_code(&self) -> RequestCodeOutcome {
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let mut phone = String::new();
        let mut rejection = None;
        self.cell.modify(|state| match check_request(state) {
            Ok(()) => {
                phone.clone_from(&state.pending_phone);
                state.is_busy = true;
                state.last_error = None;
                true
            }
            Err(reason) => {
                rejection = Some(reason);
                false
            }
        });
        if let Some(reason) = rejection {
            tracing::info!(?reason, "request_code ignored");
            return RequestCodeOutcome::Ignored { reason };
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let result = run_cancellable(cancelled, self.send_code_with_fallback(&phone)).await;
        self.commit_if_current(epoch, || match result {
            Ok(flow) => {
                self.cell.modify(|state| {
                    state.is_busy = false;
                    state.phase = SessionPhase::CodeRequested;
                    true
                });
                self.countdown
                    .start(&self.cell, self.config.resend_cooldown_secs);
                tracing::info!(?flow, "confirmation code sent");
                RequestCodeOutcome::CodeSent { flow }
            }
            Err(QogamError::Cancelled) => {
                self.finish_cancelled();
                RequestCodeOutcome::Cancelled
            }
            Err(err) => {
                tracing::warn!(%err, "failed to send confirmation code");
                let message = err.to_string();
                self.cell.modify(|state| {
                    state.is_busy = false;
                    state.last_error = Some(message.clone());
                    true
                });
                RequestCodeOutcome::Failed { message }
            }
        })
        .unwrap_or(RequestCodeOutcome::Cancelled)
    }

    /// Verifies the entered code for `pending_phone`: login confirmation first, registration
    /// confirmation if the backend reports no account. On success the token (and user, when
    /// the backend returns one) is persisted and the pending phone forgotten.
    pub async fn submit_code(&self) -> SubmitCodeOutcome {
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let mut pending = (String::new(), String::new());
        let mut rejection = None;
        self.cell.modify(|state| match check_submit(state) {
            Ok(code) => {
                pending = (state.pending_phone.clone(), code);
                state.is_busy = true;
                state.last_error = None;
                true
            }
            Err(reason) => {
                rejection = Some(reason);
                false
            }
        });
        if let Some(reason) = rejection {
            tracing::warn!(?reason, "submit_code ignored");
            return SubmitCodeOutcome::Ignored { reason };
        }
        let (phone, code) = pending;

        let epoch = self.epoch.load(Ordering::SeqCst);
        let result =
            run_cancellable(cancelled, self.confirm_code_with_fallback(&phone, &code)).await;
        self.commit_if_current(epoch, || match result.and_then(|confirmed| {
            self.persist_confirmed(&confirmed)?;
            Ok(confirmed)
        }) {
            Ok(Confirmed { flow, token, user }) => {
                self.cell.modify(|state| {
                    state.token = Some(token);
                    if user.is_some() {
                        state.user = user;
                    }
                    state.clear_otp();
                    state.is_busy = false;
                    state.last_error = None;
                    state.phase = SessionPhase::Authenticated;
                    true
                });
                tracing::info!(?flow, "session authenticated");
                SubmitCodeOutcome::Authenticated { flow }
            }
            Err(QogamError::Cancelled) => {
                self.finish_cancelled();
                SubmitCodeOutcome::Cancelled
            }
            Err(err) => {
                tracing::warn!(%err, "failed to verify confirmation code");
                let message = err.to_string();
                self.cell.modify(|state| {
                    state.clear_otp();
                    state.is_busy = false;
                    state.last_error = Some(message.clone());
                    true
                });
                SubmitCodeOutcome::Failed { message }
            }
        })
        .unwrap_or(SubmitCodeOutcome::Cancelled)
    }

    /// Aborts the outstanding send/verify call, if any. The operation resolves as cancelled and
    /// no error is recorded.
    pub fn cancel(&self) {
        self.cancel.notify_waiters();
    }

    /// Forgets the session: removes every persisted key and resets the state. Never touches the
    /// network and always succeeds locally.
    #[allow(clippy::significant_drop_tightening)]
    pub fn logout(&self) {
        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.cancel.notify_waiters();
        self.countdown.stop();

        for key in SESSION_KEYS {
            if let Err(err) = self.store.remove(key.to_string()) {
                tracing::error!(key, %err, "failed to clear session key");
            }
        }
        self.cell.modify(|state| {
            *state = SessionState::default();
            true
        });
        tracing::info!("logged out");
    }
}

impl SessionController {
    /// Subscribes to state changes. The receiver starts at the current snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.cell.subscribe()
    }

    async fn send_code_with_fallback(&self, phone: &str) -> Result<AuthFlow, QogamError> {
        match self.api.send_login_code(phone).await {
            Ok(_) => Ok(AuthFlow::Login),
            Err(err) if classify_failure(&err) == FailureKind::UserNotFound => {
                tracing::info!(%err, "no account for phone, requesting registration code");
                self.api.send_app_code(phone).await?;
                Ok(AuthFlow::Registration)
            }
            Err(err) => Err(err),
        }
    }

    async fn confirm_code_with_fallback(
        &self,
        phone: &str,
        code: &str,
    ) -> Result<Confirmed, QogamError> {
        match self.api.confirm_login_code(phone, code).await {
            Ok(session) => Ok(Confirmed {
                flow: AuthFlow::Login,
                token: session.token,
                user: Some(session.user),
            }),
            Err(err) if classify_failure(&err) == FailureKind::UserNotFound => {
                tracing::info!(%err, "no account for phone, confirming registration");
                let token = self.api.confirm_app_code(phone, code).await?;
                Ok(Confirmed {
                    flow: AuthFlow::Registration,
                    token,
                    user: None,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Runs `commit` with `logout` locked out. Returns `None` without running it if a logout
    /// happened since `epoch`.
    #[allow(clippy::significant_drop_tightening)]
    fn commit_if_current<T>(&self, epoch: u64, commit: impl FnOnce() -> T) -> Option<T> {
        let _commit = self.commit.lock().unwrap_or_else(PoisonError::into_inner);
        (self.epoch.load(Ordering::SeqCst) == epoch).then(commit)
    }

    /// Writes the credentials, then forgets the pending phone. A failed credential write is
    /// rolled back so a restart cannot restore a session the caller was told failed.
    fn persist_confirmed(&self, confirmed: &Confirmed) -> Result<(), QogamError> {
        if let Err(err) = self.write_credentials(confirmed) {
            for key in [AUTH_TOKEN_KEY, AUTH_USER_KEY] {
                if let Err(err) = self.store.remove(key.to_string()) {
                    tracing::error!(key, %err, "failed to roll back session key");
                }
            }
            return Err(err);
        }
        if let Err(err) = self.store.remove(AUTH_PHONE_KEY.to_string()) {
            tracing::error!(%err, "failed to clear pending phone");
        }
        Ok(())
    }

    fn write_credentials(&self, confirmed: &Confirmed) -> Result<(), QogamError> {
        let user = confirmed
            .user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.store
            .set(AUTH_TOKEN_KEY.to_string(), confirmed.token.clone())?;
        match user {
            Some(json) => self.store.set(AUTH_USER_KEY.to_string(), json)?,
            None => self.store.remove(AUTH_USER_KEY.to_string())?,
        }
        Ok(())
    }

    fn finish_cancelled(&self) {
        tracing::info!("operation cancelled");
        self.cell.modify(|state| {
            state.is_busy = false;
            true
        });
    }
}

#[cfg(feature = "content")]
#[uniffi::export(async_runtime = "tokio")]
impl SessionController {
    /// Fetches the profile of the authenticated user and stores it as the session user. Used
    /// after a registration, which yields a token but no user.
    ///
    /// # Errors
    /// Returns [`QogamError::Unauthenticated`] without a token, or the request/storage failure.
    pub async fn refresh_user(&self) -> Result<User, QogamError> {
        let token = self
            .cell
            .snapshot()
            .token
            .ok_or(QogamError::Unauthenticated)?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let profile = crate::content::ContentApi::authenticated(&self.config, token)
            .user_info()
            .await?;
        let user = User::from(&profile);
        self.commit_if_current(epoch, || {
            self.store
                .set(AUTH_USER_KEY.to_string(), serde_json::to_string(&user)?)?;
            self.cell.modify(|state| {
                state.user = Some(user.clone());
                true
            });
            Ok(user)
        })
        .unwrap_or(Err(QogamError::Cancelled))
    }

    /// A content client carrying the current bearer token (anonymous when logged out).
    #[must_use]
    pub fn content_api(&self) -> Arc<crate::content::ContentApi> {
        Arc::new(match self.cell.snapshot().token {
            Some(token) => crate::content::ContentApi::authenticated(&self.config, token),
            None => crate::content::ContentApi::anonymous(&self.config),
        })
    }
}

fn check_request(state: &SessionState) -> Result<(), Precondition> {
    if state.is_busy {
        return Err(Precondition::Busy);
    }
    if state.pending_phone.is_empty() {
        return Err(Precondition::MissingPhone);
    }
    if !is_normalized(&state.pending_phone) {
        return Err(Precondition::InvalidPhone);
    }
    if !state.can_resend() {
        return Err(Precondition::ResendCooldown {
            remaining_secs: state.resend_countdown,
        });
    }
    Ok(())
}

fn check_submit(state: &SessionState) -> Result<String, Precondition> {
    if state.is_busy {
        return Err(Precondition::Busy);
    }
    let code = state.otp_code();
    if code.len() != OTP_LENGTH {
        return Err(Precondition::IncompleteCode);
    }
    if state.pending_phone.is_empty() {
        return Err(Precondition::MissingPhone);
    }
    Ok(code)
}

async fn run_cancellable<T>(
    cancelled: Pin<&mut Notified<'_>>,
    operation: impl Future<Output = Result<T, QogamError>>,
) -> Result<T, QogamError> {
    tokio::select! {
        result = operation => result,
        () = cancelled => Err(QogamError::Cancelled),
    }
}

fn hydrate(store: &dyn KeyValueStore) -> SessionState {
    let read = |key: &str| match store.get(key.to_string()) {
        Ok(value) => value.filter(|value| !value.is_empty()),
        Err(err) => {
            tracing::error!(key, %err, "failed to read session key");
            None
        }
    };

    let mut state = SessionState::default();
    if let Some(token) = read(AUTH_TOKEN_KEY) {
        state.user = read(AUTH_USER_KEY).and_then(|json| {
            serde_json::from_str::<User>(&json)
                .inspect_err(|err| tracing::warn!(%err, "discarding unreadable stored user"))
                .ok()
        });
        state.token = Some(token);
        state.phase = SessionPhase::Authenticated;
    }
    if let Some(phone) = read(AUTH_PHONE_KEY).map(|phone| clean_phone_number(&phone)) {
        if !phone.is_empty() {
            state.pending_phone = phone;
            if state.phase == SessionPhase::Anonymous {
                state.phase = SessionPhase::CodeRequested;
            }
        }
    }
    state
}
