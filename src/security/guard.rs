// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Session guard: login throttling, lockout and session lifetime.
//!
//! ```text
//!             attempt_login ok
//!  LoggedOut ─────────────────▶ LoggedIn
//!   │  ▲                            │
//!   │  └── expiry | idle | logout ──┘
//!   ▼
//!  Locked (sub-state of LoggedOut, ends when lockout_duration has elapsed)
//! ```
//!
//! All state transitions take `now` explicitly. Time-driven transitions
//! (absolute expiry, idle timeout, expiry warning) are deadlines in the
//! guard's [`Timers`]; they fire when the owner calls [`SessionGuard::poll`]
//! and lazily whenever the session is read.
//!
//! The whole check runs on the client. Anyone who can edit durable storage
//! can reset the attempt counter, so the lockout is a speed bump and not a
//! security boundary.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;
use std::time::Duration as StdDuration;

use crate::audit::{SecurityEvent, SecurityEventKind, SecurityLog};
use crate::clock::Clock;
use crate::config::{host_agent, GuardConfig};
use crate::error::AttemptError;
use crate::security::attempts::{LockoutPolicy, LoginAttemptState};
use crate::security::codec::SessionCodec;
use crate::security::credential::Credential;
use crate::security::session::{Session, SESSION_KEY};
use crate::security::timers::{TimerKind, Timers};
use crate::store::{Store, StoreError};
use crate::utils::mask_sensitive;

/// Characters of a session id shown in logs.
const LOGGED_ID_PREFIX: usize = 13;

/// Observable state of the guard at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    LoggedOut,
    Locked { until: DateTime<Utc> },
    LoggedIn { expires_at: DateTime<Utc> },
}

impl std::fmt::Display for GuardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuardState::LoggedOut => write!(f, "LOGGED_OUT"),
            GuardState::Locked { .. } => write!(f, "LOCKED"),
            GuardState::LoggedIn { .. } => write!(f, "LOGGED_IN"),
        }
    }
}

/// Autonomous transitions reported by [`SessionGuard::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEvent {
    /// The session ends soon; the shell may offer to extend it.
    ExpiryWarning { expires_at: DateTime<Utc> },
    /// Absolute lifetime reached; the session was destroyed.
    SessionExpired,
    /// No activity within the idle window; the session was destroyed.
    IdleTimeout,
}

/// Why a session ended. Recorded in the security log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    Manual,
    Expired,
    Idle,
    Unreadable,
}

impl LogoutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogoutReason::Manual => "manual",
            LogoutReason::Expired => "expired",
            LogoutReason::Idle => "idle",
            LogoutReason::Unreadable => "unreadable",
        }
    }
}

/// Failed-attempt summary for the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptStatus {
    pub failed: u32,
    pub remaining: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl AttemptStatus {
    /// Warning shown before the form when earlier attempts failed.
    pub fn warning(&self) -> Option<String> {
        if self.failed == 0 || self.locked_until.is_some() || self.remaining == 0 {
            return None;
        }
        Some(format!(
            "Warning: {} failed login {}. {} remaining.",
            self.failed,
            if self.failed == 1 { "attempt" } else { "attempts" },
            crate::error::plural(u64::from(self.remaining), "attempt")
        ))
    }
}

/// Randomized delay applied before a login attempt resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginDelay {
    pub min: StdDuration,
    pub max: StdDuration,
}

impl LoginDelay {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            min: StdDuration::from_millis(config.login_delay_min_ms),
            max: StdDuration::from_millis(config.login_delay_max_ms),
        }
    }

    /// Uniform in `[min, max)`, or exactly `min` when the range is empty.
    pub fn sample(&self, rng: &mut impl Rng) -> StdDuration {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..self.max)
    }
}

/// The session guard for one tab.
///
/// `durable` holds attempt state and the security log; `tab` holds the
/// session record and should not outlive the tab (or shell process).
pub struct SessionGuard<D: Store, T: Store> {
    durable: D,
    tab: T,
    credential: Credential,
    config: GuardConfig,
    policy: LockoutPolicy,
    codec: SessionCodec,
    log: SecurityLog,
    timers: Timers,
    pending: Vec<GuardEvent>,
}

impl<D: Store, T: Store> SessionGuard<D, T> {
    pub fn new(durable: D, tab: T, config: GuardConfig) -> Self {
        let config = config.validated();
        let policy = LockoutPolicy {
            max_attempts: config.max_login_attempts,
            lockout_duration: config.lockout_duration(),
        };
        let fingerprint = config.effective_fingerprint();
        let codec = SessionCodec::for_mode(config.session_encoding, &fingerprint);
        let log = SecurityLog::new(config.security_log_capacity, host_agent());

        Self {
            durable,
            tab,
            credential: Credential::default(),
            config,
            policy,
            codec,
            log,
            timers: Timers::new(),
            pending: Vec::new(),
        }
    }

    /// Replace the built-in admin credential.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    pub fn durable(&self) -> &D {
        &self.durable
    }

    pub fn tab(&self) -> &T {
        &self.tab
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn login_delay(&self) -> LoginDelay {
        LoginDelay::from_config(&self.config)
    }

    // ------------------------------------------------------------------
    // Lockout
    // ------------------------------------------------------------------

    /// True while a lock is in force. Clears an expired lock as a side effect.
    ///
    /// If attempt state cannot be read or written the guard fails closed.
    pub fn is_locked(&mut self, now: DateTime<Utc>) -> bool {
        match self.active_lock(now) {
            Ok(until) => until.is_some(),
            Err(e) => {
                tracing::error!("LOCK_CHECK_FAILED | error={}", e);
                true
            }
        }
    }

    /// End of the active lock, clearing an expired one.
    fn active_lock(&mut self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, StoreError> {
        let mut state = LoginAttemptState::load(&self.durable)?;
        let Some(until) = state.locked_until(&self.policy) else {
            return Ok(None);
        };
        if self.policy.is_lock_active(&state, now) {
            return Ok(Some(until));
        }

        state.clear(&self.durable)?;
        self.log.record(
            &self.durable,
            SecurityEventKind::LockExpired,
            json!({ "lockedUntil": until.timestamp_millis() }),
            now,
        )?;
        Ok(None)
    }

    pub fn attempt_status(&mut self, now: DateTime<Utc>) -> Result<AttemptStatus, StoreError> {
        let locked_until = self.active_lock(now)?;
        let state = LoginAttemptState::load(&self.durable)?;
        Ok(AttemptStatus {
            failed: state.count,
            remaining: self.policy.remaining(&state),
            locked_until,
        })
    }

    // ------------------------------------------------------------------
    // Login
    // ------------------------------------------------------------------

    /// Evaluate a login attempt at `now`.
    ///
    /// A lock rejects the attempt before the secret is looked at, so a correct
    /// password during a lock still yields [`AttemptError::Locked`].
    pub fn attempt_login(
        &mut self,
        identifier: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, AttemptError> {
        if let Some(until) = self.active_lock(now)? {
            tracing::warn!("LOGIN_REJECTED | reason=locked until={}", until.to_rfc3339());
            return Err(AttemptError::Locked {
                retry_after_secs: seconds_until(now, until),
            });
        }

        let mut state = LoginAttemptState::load(&self.durable)?;

        if self.credential.matches(identifier, secret) {
            state.clear(&self.durable)?;
            // Events of an earlier session are stale once a new one starts
            self.pending.clear();
            let session = Session::issue(identifier, now, self.config.session_duration());
            self.store_session(&session)?;
            self.arm_session_timers(&session, now);
            self.log.record(
                &self.durable,
                SecurityEventKind::LoginSuccess,
                json!({ "email": identifier }),
                now,
            )?;
            tracing::info!(
                "SESSION_CREATED | session={} expires={}",
                mask_sensitive(&session.session_id, LOGGED_ID_PREFIX),
                session.expires_at.to_rfc3339()
            );
            return Ok(session);
        }

        state.record_failure(&self.durable, now)?;
        self.log.record(
            &self.durable,
            SecurityEventKind::LoginFailed,
            json!({ "attempts": state.count }),
            now,
        )?;

        if self.policy.is_exhausted(&state) {
            state.lock(&self.durable, now)?;
            self.log
                .record(&self.durable, SecurityEventKind::AccountLocked, json!({}), now)?;
            return Err(AttemptError::LockedNow {
                attempts: state.count,
                retry_after_secs: seconds_until(now, now + self.policy.lockout_duration),
            });
        }

        Err(AttemptError::InvalidCredentials {
            remaining: self.policy.remaining(&state),
        })
    }

    /// [`attempt_login`](Self::attempt_login) after a randomized, non-blocking
    /// delay, evaluated at `clock.now()` once the delay has elapsed.
    pub async fn attempt_login_delayed(
        &mut self,
        identifier: &str,
        secret: &str,
        clock: &impl Clock,
    ) -> Result<Session, AttemptError> {
        let delay = self.login_delay().sample(&mut rand::thread_rng());
        tracing::debug!("LOGIN_DELAY | ms={}", delay.as_millis());
        tokio::time::sleep(delay).await;
        self.attempt_login(identifier, secret, clock.now())
    }

    // ------------------------------------------------------------------
    // Session lifetime
    // ------------------------------------------------------------------

    /// The live session, or `None`. Fires due timers first; an expired or
    /// unreadable record is destroyed.
    pub fn current_session(&mut self, now: DateTime<Utc>) -> Option<Session> {
        self.fire_due(now);

        let raw = match self.tab.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("SESSION_READ_FAILED | error={}", e);
                return None;
            }
        };

        match self.codec.decode(&raw) {
            Ok(session) if session.is_valid_at(now) => Some(session),
            Ok(_) => {
                self.end_session_logged(LogoutReason::Expired, now);
                None
            }
            Err(e) => {
                tracing::warn!("SESSION_DISCARDED | {}", e);
                self.end_session_logged(LogoutReason::Unreadable, now);
                None
            }
        }
    }

    /// Adopt a session left in tab storage (e.g. after a reload) and arm its
    /// timers. Equivalent to [`current_session`](Self::current_session) when
    /// timers are already armed.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Session> {
        let session = self.current_session(now)?;
        if !self.timers.is_armed(TimerKind::Expiry) {
            self.arm_session_timers(&session, now);
            tracing::info!(
                "SESSION_RESUMED | session={} remaining={}",
                mask_sensitive(&session.session_id, LOGGED_ID_PREFIX),
                session.remaining_formatted(now)
            );
        }
        Some(session)
    }

    /// Destroy the session, cancel every timer and drop undelivered events.
    /// Idempotent.
    pub fn logout(&mut self, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.pending.clear();
        self.end_session(LogoutReason::Manual, now)
    }

    /// Push the idle deadline out by the idle window. No-op when logged out.
    pub fn note_activity(&mut self, now: DateTime<Utc>) {
        self.fire_due(now);
        if self.timers.is_armed(TimerKind::Expiry) {
            self.timers.arm(TimerKind::Idle, now + self.config.idle_duration());
        }
    }

    /// Restart the absolute lifetime of the live session from `now`.
    pub fn extend_session(&mut self, now: DateTime<Utc>) -> Result<Option<Session>, AttemptError> {
        let Some(mut session) = self.current_session(now) else {
            return Ok(None);
        };
        session.expires_at = now + self.config.session_duration();
        self.store_session(&session)?;
        self.arm_session_timers(&session, now);
        self.pending
            .retain(|event| !matches!(event, GuardEvent::ExpiryWarning { .. }));
        self.log.record(
            &self.durable,
            SecurityEventKind::SessionExtended,
            json!({ "expiresAt": session.expires_at.timestamp_millis() }),
            now,
        )?;
        Ok(Some(session))
    }

    /// Constant-time check of `token` against the live session's CSRF token.
    pub fn verify_csrf(&mut self, token: &str, now: DateTime<Utc>) -> bool {
        self.current_session(now)
            .map(|session| session.csrf_matches(token))
            .unwrap_or(false)
    }

    pub fn state(&mut self, now: DateTime<Utc>) -> GuardState {
        if let Some(session) = self.current_session(now) {
            return GuardState::LoggedIn {
                expires_at: session.expires_at,
            };
        }
        match self.active_lock(now) {
            Ok(Some(until)) => GuardState::Locked { until },
            Ok(None) => GuardState::LoggedOut,
            Err(e) => {
                tracing::error!("LOCK_CHECK_FAILED | error={}", e);
                GuardState::LoggedOut
            }
        }
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Fire due timers and return every transition since the last poll.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Vec<GuardEvent> {
        self.fire_due(now);
        std::mem::take(&mut self.pending)
    }

    /// Earliest armed deadline, for callers that sleep between polls.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    fn fire_due(&mut self, now: DateTime<Utc>) {
        let expiry = self.timers.deadline(TimerKind::Expiry);
        for (kind, at) in self.timers.take_due(now) {
            match kind {
                TimerKind::ExpiryWarning => {
                    if let Some(expires_at) = expiry {
                        tracing::info!("SESSION_WARNING | expires={}", expires_at.to_rfc3339());
                        self.pending.push(GuardEvent::ExpiryWarning { expires_at });
                    }
                }
                TimerKind::Expiry => {
                    tracing::info!("SESSION_EXPIRED | deadline={}", at.to_rfc3339());
                    self.end_session_logged(LogoutReason::Expired, now);
                    self.pending.push(GuardEvent::SessionExpired);
                    // Remaining due timers were cancelled with the session.
                    break;
                }
                TimerKind::Idle => {
                    tracing::info!("SESSION_IDLE_TIMEOUT | deadline={}", at.to_rfc3339());
                    self.end_session_logged(LogoutReason::Idle, now);
                    self.pending.push(GuardEvent::IdleTimeout);
                    break;
                }
            }
        }
    }

    fn arm_session_timers(&mut self, session: &Session, now: DateTime<Utc>) {
        self.timers.arm(TimerKind::Expiry, session.expires_at);
        let warn_at = session.expires_at - self.config.expiry_warning_lead();
        if warn_at > now {
            self.timers.arm(TimerKind::ExpiryWarning, warn_at);
        } else {
            self.timers.cancel(TimerKind::ExpiryWarning);
        }
        self.timers.arm(TimerKind::Idle, now + self.config.idle_duration());
    }

    // ------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------

    fn store_session(&self, session: &Session) -> Result<(), AttemptError> {
        let encoded = self.codec.encode(session)?;
        self.tab.set(SESSION_KEY, &encoded)?;
        Ok(())
    }

    fn end_session(&mut self, reason: LogoutReason, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.timers.cancel_all();
        let existed = match self.tab.get(SESSION_KEY) {
            Ok(raw) => raw.is_some(),
            Err(e) => {
                tracing::warn!("SESSION_READ_FAILED | during=logout error={}", e);
                true
            }
        };
        self.tab.remove(SESSION_KEY)?;
        if existed {
            self.log.record(
                &self.durable,
                SecurityEventKind::Logout,
                json!({ "reason": reason.as_str() }),
                now,
            )?;
        }
        Ok(())
    }

    fn end_session_logged(&mut self, reason: LogoutReason, now: DateTime<Utc>) {
        if let Err(e) = self.end_session(reason, now) {
            tracing::error!("SESSION_END_FAILED | reason={} error={}", reason.as_str(), e);
        }
    }

    // ------------------------------------------------------------------
    // Security log
    // ------------------------------------------------------------------

    pub fn security_log(&self) -> &SecurityLog {
        &self.log
    }

    pub fn security_events(&self) -> Result<Vec<SecurityEvent>, StoreError> {
        self.log.entries(&self.durable)
    }
}

fn seconds_until(now: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    let millis = until.signed_duration_since(now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
