// Copyright (c) 2024-2025 Jesse Morgan / Morgan Forge
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Race Detection Tests for the storage layer
//!
//! Stores are shared by reference between the guard and the content
//! repository, so concurrent access must neither lose writes nor deadlock.
//!
//! # Running with ThreadSanitizer
//!
//! ```bash
//! RUSTFLAGS="-Z sanitizer=thread" cargo +nightly test \
//!     --target x86_64-unknown-linux-gnu --test store_concurrency
//! ```

use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use tokio::time::timeout;

use siteguard::store::{JsonFileStore, MemoryStore, Store};

const CONCURRENCY_LEVEL: usize = 16;
const ITERATIONS_PER_TASK: usize = 25;
const TEST_TIMEOUT_SECS: u64 = 30;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_store_concurrent_read_write() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = vec![];

    for i in 0..CONCURRENCY_LEVEL {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for j in 0..ITERATIONS_PER_TASK {
                let key = format!("task-{}-{}", i, j);
                store.set(&key, "v").unwrap();
                assert_eq!(store.get(&key).unwrap().as_deref(), Some("v"));
                if j % 5 == 0 {
                    store.remove(&key).unwrap();
                }
            }
        }));
    }

    let result = timeout(Duration::from_secs(TEST_TIMEOUT_SECS), async {
        for handle in handles {
            handle.await.expect("Task panicked");
        }
    })
    .await;
    assert!(result.is_ok(), "Test timed out");

    // Every fifth key was removed again
    assert_eq!(store.len(), CONCURRENCY_LEVEL * ITERATIONS_PER_TASK * 4 / 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_store_concurrent_writers_keep_every_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("local_storage.json");
    let store = Arc::new(JsonFileStore::open(&path).unwrap());
    let mut handles = vec![];

    for i in 0..CONCURRENCY_LEVEL {
        let store = store.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for j in 0..5 {
                store.set(&format!("writer-{}-{}", i, j), &j.to_string()).unwrap();
            }
        }));
    }

    let result = timeout(Duration::from_secs(TEST_TIMEOUT_SECS), async {
        for handle in handles {
            handle.await.expect("Task panicked");
        }
    })
    .await;
    assert!(result.is_ok(), "Test timed out");

    let reopened = JsonFileStore::open(&path).unwrap();
    for i in 0..CONCURRENCY_LEVEL {
        for j in 0..5 {
            assert_eq!(
                reopened.get(&format!("writer-{}-{}", i, j)).unwrap(),
                Some(j.to_string())
            );
        }
    }
}
