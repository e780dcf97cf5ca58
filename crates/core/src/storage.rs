//! The versioned storage contract.

use crate::error::Result;
use crate::types::{StorageDetails, Version, Versioned};
use async_trait::async_trait;

/// Versioned key-value storage with optimistic concurrency.
///
/// Every stored value carries a [`Version`]. Writes can be made conditional
/// on the version a caller last observed, and callers can block until the
/// value under a key moves away from a known version.
///
/// Implementations are shared between tasks (`Arc<dyn Storage>`) and all
/// methods may be called concurrently, including concurrently with
/// [`Storage::close`]. Once closed, every method fails with
/// [`crate::Error::StorageClosed`].
///
/// Precondition mismatches are not errors: a skipped write returns
/// `Ok(None)` and a delete that removed nothing returns `Ok(false)`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the current value of `key`.
    ///
    /// Returns `None` if the key does not exist.
    async fn get_value(&self, key: &str) -> Result<Option<Versioned>>;

    /// Block until the value of `key` differs from `version`.
    ///
    /// With `version == None` this waits for the key to come into
    /// existence. With a version it waits for any later write or a delete;
    /// a delete resolves to `Ok(None)`. Returns immediately if the value
    /// has already changed.
    async fn wait_for_value(&self, key: &str, version: Option<Version>)
        -> Result<Option<Versioned>>;

    /// Create `key` if it does not exist.
    ///
    /// Returns the new version, or `None` if the key already exists.
    async fn create_value(&self, key: &str, value: &str) -> Result<Option<Version>>;

    /// Overwrite an existing `key`.
    ///
    /// With `version == None` any existing value is overwritten; with a
    /// version the current value must be at exactly that version. Returns
    /// the new version, or `None` if the precondition did not hold.
    async fn update_value(
        &self,
        key: &str,
        value: &str,
        version: Option<Version>,
    ) -> Result<Option<Version>>;

    /// Create `key` or overwrite it.
    ///
    /// With `version == None` the write is unconditional. With a version the
    /// write happens if the key is absent or at exactly that version.
    /// Returns the new version, or `None` if a conflicting write won.
    async fn create_or_update_value(
        &self,
        key: &str,
        value: &str,
        version: Option<Version>,
    ) -> Result<Option<Version>>;

    /// Delete `key`, optionally only if it is at `version`.
    ///
    /// Returns whether a value was deleted.
    async fn delete_value(&self, key: &str, version: Option<Version>) -> Result<bool>;

    /// Close the storage and release every blocked wait.
    ///
    /// A second call fails with [`crate::Error::StorageClosed`].
    async fn close(&self) -> Result<()>;

    /// Report every live entry under this storage.
    async fn inspect(&self) -> Result<StorageDetails>;
}
