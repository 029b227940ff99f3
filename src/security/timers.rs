// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Cancellable deadlines owned by the session guard.
//!
//! Each [`TimerKind`] has at most one armed deadline; re-arming replaces it.
//! Nothing fires on its own: the owner calls [`Timers::take_due`] with the
//! current time, either lazily or from an event loop sleeping until
//! [`Timers::next_deadline`].

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Absolute session lifetime.
    Expiry,
    /// Inactivity limit; re-armed on activity.
    Idle,
    /// Heads-up ahead of `Expiry`.
    ExpiryWarning,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerKind::Expiry => write!(f, "EXPIRY"),
            TimerKind::Idle => write!(f, "IDLE"),
            TimerKind::ExpiryWarning => write!(f, "EXPIRY_WARNING"),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Timers {
    deadlines: BTreeMap<TimerKind, DateTime<Utc>>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` for `at`, replacing any earlier deadline of that kind.
    pub fn arm(&mut self, kind: TimerKind, at: DateTime<Utc>) {
        tracing::debug!("TIMER_ARMED | kind={} at={}", kind, at.to_rfc3339());
        self.deadlines.insert(kind, at);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if self.deadlines.remove(&kind).is_some() {
            tracing::debug!("TIMER_CANCELLED | kind={}", kind);
        }
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<DateTime<Utc>> {
        self.deadlines.get(&kind).copied()
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.deadlines.values().min().copied()
    }

    /// Disarm and return every timer whose deadline is `<= now`, earliest first.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<(TimerKind, DateTime<Utc>)> {
        let mut due: Vec<(TimerKind, DateTime<Utc>)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(kind, at)| (*kind, *at))
            .collect();
        for (kind, _) in &due {
            self.deadlines.remove(kind);
        }
        due.sort_by_key(|(kind, at)| (*at, *kind));
        due
    }
}
