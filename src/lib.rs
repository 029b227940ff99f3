// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! siteguard - admin login and session guard for a static NGO site
//!
//! Throttled login against a single built-in admin credential, lockout
//! after repeated failures, a session with absolute and idle lifetimes,
//! and a small content dashboard behind it.
//!
//! **LoggedOut** -> **LoggedIn** -> (expiry | idle | logout) -> **LoggedOut**
//!
//! # Core Modules
//!
//! - [`security`] - Session guard, lockout, session record and timers
//! - [`store`] - Key/value storage (in-memory tab, JSON file durable)
//! - [`clock`] - Injectable time source
//! - [`config`] - Guard configuration loaded from `config.json`
//! - [`audit`] - Capped security event log
//! - [`content`] - Dashboard content, media, activity and typed collections
//! - [`cli`] - Interactive shell input and command parsing
//! - [`error`] - Login/session failure taxonomy

pub mod audit;
pub mod cli;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod security;
pub mod store;
pub mod utils;

pub use audit::{SecurityEvent, SecurityEventKind, SecurityLog, SECURITY_LOG_KEY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{EncodingMode, GuardConfig};
pub use content::{ContentError, ContentRepository, DashboardStats};
pub use error::AttemptError;
pub use security::{
    AttemptStatus, Credential, GuardEvent, GuardState, Session, SessionGuard, DEFAULT_CREDENTIAL,
};
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
pub use utils::mask_sensitive;
