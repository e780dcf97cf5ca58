//! Etcd Storage Comprehensive Test Suite
//!
//! Exercises `EtcdStorage` end to end over the in-memory revisioned store.
//!
//! ## Areas
//!
//! 1. Basic reads and writes, outcomes that are not errors
//! 2. Optimistic concurrency with pinned versions
//! 3. Blocking waits and their races with close
//! 4. Lifecycle (close) behaviour
//! 5. Inspect snapshots
//! 6. Property tests against a model map
//! 7. Store-independent contract scenarios
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test etcd_storage
//!
//! # Wait tests only
//! cargo test --test etcd_storage wait::
//! ```

use std::sync::Arc;
use std::time::Duration;

use versionedkv::coordination::MemoryClient;
use versionedkv::prelude::*;

#[path = "../shared/scenarios.rs"]
pub mod scenarios;

// Test modules
pub mod basic_ops;
pub mod contract;
pub mod inspect;
pub mod lifecycle;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// A storage handle together with the client it talks to.
pub struct TestStorage {
    pub client: Arc<MemoryClient>,
    pub storage: Arc<EtcdStorage<MemoryClient>>,
}

/// Unique prefix per test, so storages never see each other's keys.
pub fn random_prefix() -> String {
    format!("versionedkv-{}/", rand::random::<u64>())
}

/// Create a storage over a fresh in-memory client.
pub fn create_storage() -> TestStorage {
    init_tracing();
    let client = Arc::new(MemoryClient::new());
    let storage = StorageBuilder::new()
        .prefix(random_prefix())
        .build(Arc::clone(&client));
    TestStorage {
        client,
        storage: Arc::new(storage),
    }
}

/// Route storage logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Block until `count` watches are registered on `client`.
pub async fn wait_for_watchers(client: &MemoryClient, count: usize) {
    for _ in 0..500 {
        if client.watcher_count() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("expected {} watchers, have {}", count, client.watcher_count());
}

/// Assert that `err` is the closed-storage sentinel.
pub fn assert_closed(err: Error) {
    assert!(err.is_closed(), "expected StorageClosed, got {:?}", err);
}
