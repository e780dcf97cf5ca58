//! Versioned key-value storage backed by a revisioned coordination store.
//!
//! [`EtcdStorage`] implements [`versionedkv_core::Storage`] on top of any
//! [`versionedkv_coordination::KvClient`]:
//!
//! - versions are the store's modification revisions
//! - conditional writes are single transactions guarded on creation and
//!   modification revisions
//! - waits watch the key from one revision past the caller's baseline and
//!   race the watch against the handle's close signal
//!
//! # Example
//!
//! ```ignore
//! use versionedkv_etcd::{EtcdStorage, Options};
//!
//! let storage = EtcdStorage::new(client, Options::with_prefix("app/"));
//! let version = storage.create_value("leader", "node-1").await?;
//! let next = storage.wait_for_value("leader", version).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod gate;
mod keys;
pub mod options;
mod predicates;
mod storage;
mod wait;

pub use options::{ConfigError, Options, DEFAULT_PREFIX};
pub use storage::EtcdStorage;
