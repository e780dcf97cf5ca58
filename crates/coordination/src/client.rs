//! The client contract for a revisioned key-value store.

use crate::error::ClientError;
use crate::types::{
    DeleteResponse, GetResponse, PutResponse, TxnRequest, TxnResponse, WatchResponse,
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Item yielded by a [`WatchStream`]. Stream errors arrive inline.
pub type WatchItem = Result<WatchResponse, ClientError>;

/// Ordered stream of change batches for one watched key.
///
/// Dropping the stream cancels the watch registration.
#[derive(Debug)]
pub struct WatchStream {
    rx: mpsc::UnboundedReceiver<WatchItem>,
}

impl WatchStream {
    /// Wrap the receiving half of a watch channel.
    pub fn new(rx: mpsc::UnboundedReceiver<WatchItem>) -> Self {
        Self { rx }
    }

    /// Next batch, or `None` once the store closed the stream.
    pub async fn next(&mut self) -> Option<WatchItem> {
        self.rx.recv().await
    }
}

/// Connected client of a revisioned key-value store.
///
/// Implementations manage their own connections and are shared between
/// tasks. No method retries; failures are returned as they occur.
#[async_trait]
pub trait KvClient: Send + Sync {
    /// Read a single key.
    async fn get(&self, key: &str) -> Result<GetResponse, ClientError>;

    /// Read every key starting with `prefix`, sorted by key.
    async fn get_prefix(&self, prefix: &str) -> Result<GetResponse, ClientError>;

    /// Write a key unconditionally.
    async fn put(&self, key: &str, value: &str) -> Result<PutResponse, ClientError>;

    /// Delete a key unconditionally.
    async fn delete(&self, key: &str) -> Result<DeleteResponse, ClientError>;

    /// Run a conditional transaction atomically.
    async fn txn(&self, txn: TxnRequest) -> Result<TxnResponse, ClientError>;

    /// Watch a single key for changes committed at or after `start_revision`.
    ///
    /// A `start_revision` of 0 or less watches from the next revision.
    async fn watch(&self, key: &str, start_revision: i64) -> Result<WatchStream, ClientError>;
}
