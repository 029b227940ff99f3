// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Admin login and session controls.
//!
//! ## Controls
//!
//! - **Lockout**: 3 failed attempts lock the login form for 15 minutes
//! - **Session lifetime**: 2 hours absolute, 30 minutes idle
//! - **Expiry warning**: raised 5 minutes before the absolute deadline
//! - **Login delay**: 1-2 s randomized delay before an attempt resolves
//! - **Audit logging**: every transition lands in the security log
//!
//! ## Usage
//!
//! ```no_run
//! use chrono::Utc;
//! use siteguard::config::GuardConfig;
//! use siteguard::security::SessionGuard;
//! use siteguard::store::MemoryStore;
//!
//! let mut guard =
//!     SessionGuard::new(MemoryStore::new(), MemoryStore::new(), GuardConfig::default());
//!
//! match guard.attempt_login("admin@ngo.org", "hunter2", Utc::now()) {
//!     Ok(session) => println!("welcome, {}", session.identifier),
//!     Err(e) => println!("{}", e.user_message()),
//! }
//!
//! for event in guard.poll(Utc::now()) {
//!     println!("{:?}", event);
//! }
//! ```

pub mod attempts;
pub mod codec;
pub mod credential;
pub mod guard;
pub mod locks;
pub mod password;
pub mod session;
pub mod timers;

pub use attempts::{
    LockoutPolicy, LoginAttemptState, ACCOUNT_LOCKED_KEY, LAST_ATTEMPT_KEY, LOGIN_ATTEMPTS_KEY,
};
pub use codec::SessionCodec;
pub use credential::{hash_secret, Credential, DEFAULT_ADMIN_IDENTIFIER, DEFAULT_CREDENTIAL};
pub use guard::{AttemptStatus, GuardEvent, GuardState, LoginDelay, LogoutReason, SessionGuard};
pub use locks::{resilient_read, resilient_write};
pub use password::{password_strength, PasswordStrength};
pub use session::{Session, SESSION_KEY};
pub use timers::{TimerKind, Timers};
