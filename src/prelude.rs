//! Convenient imports for versionedkv.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```ignore
//! use versionedkv::prelude::*;
//!
//! let storage = StorageBuilder::new().prefix("app/").build(client);
//! storage.create_or_update_value("key", "value", None).await?;
//! ```

// Main entry point
pub use crate::builder::StorageBuilder;

// Error handling
pub use versionedkv_core::{Error, Result};

// Storage contract
pub use versionedkv_core::Storage;

// Core types
pub use versionedkv_core::{StorageDetails, ValueDetails, Version, Versioned};

// Backend
pub use versionedkv_etcd::{EtcdStorage, Options};

// Client contract
pub use versionedkv_coordination::{KvClient, MemoryClient};
