//! # versionedkv
//!
//! Versioned key-value storage with optimistic concurrency, backed by a
//! revisioned coordination store.
//!
//! Every stored value carries an opaque [`Version`]. Writes can be pinned
//! to the version a caller last read, and callers can block until a value
//! moves away from a known version.
//!
//! ## Quick Start
//!
//! ```ignore
//! use versionedkv::prelude::*;
//!
//! let storage = StorageBuilder::new().prefix("app/").build(client);
//!
//! let v1 = storage.create_value("a", "1").await?.unwrap();
//! let v2 = storage.update_value("a", "2", Some(v1)).await?.unwrap();
//! assert_eq!(storage.get_value("a").await?, Some(Versioned::new("2", v2)));
//!
//! assert!(storage.delete_value("a", Some(v2)).await?);
//! storage.close().await?;
//! ```
//!
//! ## Outcomes That Are Not Errors
//!
//! | Situation | Result |
//! |-----------|--------|
//! | read of an absent key | `Ok(None)` |
//! | create of an existing key | `Ok(None)` |
//! | update/upsert with a stale version | `Ok(None)` |
//! | delete that removed nothing | `Ok(false)` |
//! | wait that saw a delete | `Ok(None)` |

#![warn(missing_docs)]

mod builder;

pub mod prelude;

pub use builder::StorageBuilder;

pub use versionedkv_coordination as coordination;
pub use versionedkv_core::{
    BoxError, Error, Result, Storage, StorageDetails, ValueDetails, Version, Versioned,
};
pub use versionedkv_etcd::{ConfigError, EtcdStorage, Options, DEFAULT_PREFIX};
