//! Builder for storage handles.
//!
//! This module provides [`StorageBuilder`], the configuration entry point
//! for creating a storage handle over a connected client.

use std::sync::Arc;
use versionedkv_coordination::KvClient;
use versionedkv_core::Storage;
use versionedkv_etcd::{EtcdStorage, Options};

/// Builder for storage configuration.
///
/// # Example
///
/// ```ignore
/// // Typed handle
/// let storage = StorageBuilder::new()
///     .prefix("jobs/")
///     .build(client);
///
/// // Type-erased handle, shareable across tasks
/// let storage: Arc<dyn Storage> = StorageBuilder::new().build_dyn(client);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StorageBuilder {
    options: Options,
}

impl StorageBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix. An empty prefix means the default one.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.prefix = prefix.into();
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Build a storage handle over `client`.
    pub fn build<C: KvClient>(self, client: Arc<C>) -> EtcdStorage<C> {
        EtcdStorage::new(client, self.options)
    }

    /// Build a type-erased storage handle over `client`.
    pub fn build_dyn<C: KvClient + 'static>(self, client: Arc<C>) -> Arc<dyn Storage> {
        Arc::new(self.build(client))
    }
}
