//! Live etcd Test Suite
//!
//! Runs the store-independent scenarios against a real cluster. Every test
//! is skipped unless `ETCD_ENDPOINT` names a reachable endpoint.
//!
//! ## Running Tests
//!
//! ```bash
//! ETCD_ENDPOINT=127.0.0.1:2379 cargo test --features etcd --test live_etcd
//! ```

use std::sync::Arc;

use versionedkv::coordination::etcd;
use versionedkv::prelude::*;

#[path = "../shared/scenarios.rs"]
pub mod scenarios;

use scenarios::scenario_tests;

/// Open a storage under a fresh prefix, or `None` without a cluster.
async fn open_storage() -> Option<Arc<dyn Storage>> {
    let Ok(endpoint) = std::env::var("ETCD_ENDPOINT") else {
        eprintln!("ETCD_ENDPOINT not set, skipping");
        return None;
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();

    let client = etcd::connect(&[endpoint])
        .await
        .expect("failed to connect to ETCD_ENDPOINT");
    let prefix = format!("versionedkv-{}/", rand::random::<u64>());
    Some(StorageBuilder::new().prefix(prefix).build_dyn(Arc::new(client)))
}

scenario_tests!(
    open_storage;
    create_then_get,
    update_honors_pinned_version,
    upsert_honors_pinned_version,
    delete_honors_pinned_version,
    wait_returns_when_already_changed,
    wait_released_by_update,
    wait_released_by_delete,
    wait_released_by_create,
    close_releases_wait_and_fails_operations,
    inspect_lists_live_values,
);
