//! Revisioned coordination-store client contract.
//!
//! A storage backend issues its operations through [`KvClient`]: point
//! reads and writes, conditional transactions guarded by revision
//! comparisons, and single-key watches. [`MemoryClient`] is an in-process
//! store with the same revision semantics, used to exercise backends
//! without a running cluster. With the `etcd` feature, `etcd::Client`
//! implements [`KvClient`] against a live cluster.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
#[cfg(feature = "etcd")]
pub mod etcd;
pub mod memory;
pub mod types;

pub use client::{KvClient, WatchItem, WatchStream};
pub use error::ClientError;
pub use memory::MemoryClient;
pub use types::{
    Compare, CompareOp, CompareTarget, DeleteResponse, Event, EventType, GetResponse, KeyValue,
    PutResponse, ResponseHeader, TxnOp, TxnOpResponse, TxnRequest, TxnResponse, WatchResponse,
};
