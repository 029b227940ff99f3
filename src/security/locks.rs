// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Poison-tolerant lock helpers for the storage layer.
//!
//! Stores keep their key space behind an `RwLock` so they can be shared by
//! reference between the guard and the content repository. A poisoned lock
//! is logged at `error` and its guard is handed back.
//!
//! ```
//! use std::sync::RwLock;
//! use siteguard::security::locks::{resilient_read, resilient_write};
//!
//! let lock = RwLock::new(vec!["admin_login_attempts"]);
//! resilient_write(&lock).push("admin_account_locked");
//! assert_eq!(resilient_read(&lock).len(), 2);
//! ```

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Acquire a read lock, recovering the guard if the lock was poisoned.
#[inline]
pub fn resilient_read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!(
                target: "security::locks",
                event = "LOCK_POISONED_READ",
                "Store lock was poisoned during read. Recovering the key space; \
                 a previous writer panicked and stored values may be stale."
            );
            poisoned.into_inner()
        }
    }
}

/// Acquire a write lock, recovering the guard if the lock was poisoned.
#[inline]
pub fn resilient_write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::error!(
                target: "security::locks",
                event = "LOCK_POISONED_WRITE",
                "Store lock was poisoned during write. Recovering the key space; \
                 a previous writer panicked and stored values may be stale."
            );
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_read_after_write() {
        let lock = RwLock::new(HashMap::new());
        resilient_write(&lock).insert("admin_login_attempts", "2");
        assert_eq!(resilient_read(&lock).get("admin_login_attempts"), Some(&"2"));
    }

    #[test]
    fn test_poisoned_store_still_readable_and_writable() {
        let lock = Arc::new(RwLock::new(HashMap::from([("admin_session", "x")])));
        let lock_clone = Arc::clone(&lock);

        let handle = thread::spawn(move || {
            let _guard = lock_clone.write().unwrap();
            panic!("intentional panic to poison lock");
        });
        let _ = handle.join();

        assert_eq!(resilient_read(&lock).get("admin_session"), Some(&"x"));

        resilient_write(&lock).remove("admin_session");
        assert!(resilient_read(&lock).is_empty());
    }
}
