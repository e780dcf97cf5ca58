//! Versioned storage over a revisioned coordination store.
//!
//! Each [`Storage`] operation becomes one store request:
//!
//! | Operation | Request | Guard |
//! |-----------|---------|-------|
//! | `get_value` | get | - |
//! | `create_value` | txn: put | key absent |
//! | `update_value(None)` | txn: put | key present |
//! | `update_value(V)` | txn: put | key at V |
//! | `create_or_update_value(None)` | put | - |
//! | `create_or_update_value(V)` | txn: else put | key present at other than V |
//! | `delete_value(None)` | delete | - |
//! | `delete_value(V)` | txn: delete | key at V |
//! | `inspect` | prefix get | - |
//!
//! A version is the key's modification revision. Guards that do not hold
//! are reported as `Ok(None)` / `Ok(false)`, never as errors.

use crate::gate::LifecycleGate;
use crate::keys::KeyMapper;
use crate::options::Options;
use crate::predicates::{absent, at_version, conflict_detected, present};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use versionedkv_coordination::{KeyValue, KvClient, TxnOp, TxnOpResponse, TxnRequest, TxnResponse};
use versionedkv_core::{
    Error, Result, Storage, StorageDetails, ValueDetails, Version, Versioned,
};

/// Storage handle over a connected coordination-store client.
///
/// The client is shared, not owned: closing the storage does not close the
/// client. Every key lives under the configured prefix; keys outside it are
/// invisible to the handle.
///
/// # Example
///
/// ```ignore
/// let storage = EtcdStorage::new(client, Options::with_prefix("app/"));
///
/// let v1 = storage.create_value("a", "1").await?.unwrap();
/// let v2 = storage.update_value("a", "2", Some(v1)).await?.unwrap();
/// assert!(v2 > v1);
/// ```
pub struct EtcdStorage<C> {
    pub(crate) client: Arc<C>,
    pub(crate) keys: KeyMapper,
    pub(crate) gate: LifecycleGate,
}

impl<C: KvClient> EtcdStorage<C> {
    /// Create a storage handle. An empty prefix falls back to the default.
    pub fn new(client: Arc<C>, options: Options) -> Self {
        let options = options.sanitized();
        Self {
            client,
            keys: KeyMapper::new(options.prefix),
            gate: LifecycleGate::new(),
        }
    }

    /// The key prefix in effect.
    pub fn prefix(&self) -> &str {
        self.keys.prefix()
    }

    /// The underlying client.
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Whether [`Storage::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.gate.is_closed()
    }
}

pub(crate) fn versioned(kv: KeyValue) -> Versioned {
    Versioned::new(kv.value, Version::from_raw(kv.mod_revision))
}

/// Version produced by a transaction whose executed branch is a single put.
fn written_version(resp: TxnResponse) -> Version {
    let committed = resp.header.revision;
    let revision = resp
        .into_first()
        .and_then(TxnOpResponse::into_put)
        .map(|put| put.header.revision)
        .filter(|revision| *revision > 0)
        .unwrap_or(committed);
    Version::from_raw(revision)
}

#[async_trait]
impl<C: KvClient> Storage for EtcdStorage<C> {
    async fn get_value(&self, key: &str) -> Result<Option<Versioned>> {
        self.gate.check()?;
        let full_key = self.keys.full_key(key);
        let resp = self.client.get(&full_key).await.map_err(Error::backend)?;
        Ok(resp.kvs.into_iter().next().map(versioned))
    }

    async fn wait_for_value(
        &self,
        key: &str,
        version: Option<Version>,
    ) -> Result<Option<Versioned>> {
        self.wait(key, version).await
    }

    async fn create_value(&self, key: &str, value: &str) -> Result<Option<Version>> {
        self.gate.check()?;
        let full_key = self.keys.full_key(key);
        let txn = TxnRequest::new()
            .when([absent(&full_key)])
            .and_then([TxnOp::put(&full_key, value)]);
        let resp = self.client.txn(txn).await.map_err(Error::backend)?;
        if !resp.succeeded {
            debug!(key, "create skipped, key exists");
            return Ok(None);
        }
        let version = written_version(resp);
        debug!(key, %version, "created");
        Ok(Some(version))
    }

    async fn update_value(
        &self,
        key: &str,
        value: &str,
        version: Option<Version>,
    ) -> Result<Option<Version>> {
        self.gate.check()?;
        let full_key = self.keys.full_key(key);
        let guard = match version {
            None => present(&full_key),
            Some(version) => at_version(&full_key, version),
        };
        let txn = TxnRequest::new()
            .when([guard])
            .and_then([TxnOp::put(&full_key, value)]);
        let resp = self.client.txn(txn).await.map_err(Error::backend)?;
        if !resp.succeeded {
            debug!(key, expected = ?version, "update skipped, precondition failed");
            return Ok(None);
        }
        let version = written_version(resp);
        debug!(key, %version, "updated");
        Ok(Some(version))
    }

    async fn create_or_update_value(
        &self,
        key: &str,
        value: &str,
        version: Option<Version>,
    ) -> Result<Option<Version>> {
        self.gate.check()?;
        let full_key = self.keys.full_key(key);
        let Some(expected) = version else {
            let resp = self
                .client
                .put(&full_key, value)
                .await
                .map_err(Error::backend)?;
            let version = Version::from_raw(resp.header.revision);
            debug!(key, %version, "upserted");
            return Ok(Some(version));
        };

        // One round trip covers both "absent, create" and "still at
        // expected, overwrite": the put sits in the failure branch.
        let txn = TxnRequest::new()
            .when(conflict_detected(&full_key, expected))
            .or_else([TxnOp::put(&full_key, value)]);
        let resp = self.client.txn(txn).await.map_err(Error::backend)?;
        if resp.succeeded {
            debug!(key, %expected, "upsert skipped, conflicting write");
            return Ok(None);
        }
        let version = written_version(resp);
        debug!(key, %version, "upserted");
        Ok(Some(version))
    }

    async fn delete_value(&self, key: &str, version: Option<Version>) -> Result<bool> {
        self.gate.check()?;
        let full_key = self.keys.full_key(key);
        let deleted = match version {
            None => {
                let resp = self
                    .client
                    .delete(&full_key)
                    .await
                    .map_err(Error::backend)?;
                resp.deleted >= 1
            }
            Some(version) => {
                let txn = TxnRequest::new()
                    .when([at_version(&full_key, version)])
                    .and_then([TxnOp::delete(&full_key)]);
                let resp = self.client.txn(txn).await.map_err(Error::backend)?;
                resp.succeeded
            }
        };
        debug!(key, expected = ?version, deleted, "delete");
        Ok(deleted)
    }

    async fn close(&self) -> Result<()> {
        if let Err(err) = self.gate.close() {
            warn!(prefix = self.keys.prefix(), "close called on closed storage");
            return Err(err);
        }
        info!(prefix = self.keys.prefix(), "storage closed");
        Ok(())
    }

    async fn inspect(&self) -> Result<StorageDetails> {
        if self.gate.is_closed() {
            return Ok(StorageDetails::closed());
        }
        let resp = self
            .client
            .get_prefix(self.keys.prefix())
            .await
            .map_err(Error::backend)?;

        let mut details = StorageDetails::default();
        for kv in resp.kvs {
            let Some(key) = self.keys.logical_key(&kv.key) else {
                continue;
            };
            let key = key.to_string();
            details.values.insert(
                key,
                ValueDetails {
                    value: kv.value,
                    version: Version::from_raw(kv.mod_revision),
                },
            );
        }
        Ok(details)
    }
}
