//! Contract Tests
//!
//! The store-independent scenarios, run over the in-memory store. The same
//! scenarios run against a live cluster in the `live_etcd` suite.

use crate::scenarios::scenario_tests;
use crate::*;

async fn open_storage() -> Option<Arc<dyn Storage>> {
    init_tracing();
    let client = Arc::new(MemoryClient::with_retention(64));
    Some(
        StorageBuilder::new()
            .prefix(random_prefix())
            .build_dyn(client),
    )
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
