//! In-memory revisioned store.
//!
//! `MemoryClient` keeps the whole keyspace, its change history and the
//! registered watches behind a single lock, so every request observes and
//! produces one consistent revision. It follows the revision rules of a
//! real coordination store:
//!
//! - the global revision advances once per mutating request (a transaction
//!   counts as one request), never for reads or no-op deletes
//! - a re-created key gets a fresh `create_revision` and restarts its
//!   `version` at 1
//! - a delete event carries `version == 0` and the delete's revision
//! - a watch replays retained history from its start revision as one batch,
//!   then receives one batch per committed revision

use crate::client::{KvClient, WatchItem, WatchStream};
use crate::error::ClientError;
use crate::types::{
    DeleteResponse, Event, EventType, GetResponse, KeyValue, PutResponse, ResponseHeader, TxnOp,
    TxnOpResponse, TxnRequest, TxnResponse, WatchResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

struct Watcher {
    key: String,
    tx: mpsc::UnboundedSender<WatchItem>,
}

#[derive(Default)]
struct State {
    /// Revision of the latest committed mutation
    revision: i64,
    /// History at or below this revision is gone
    compacted: i64,
    kvs: BTreeMap<String, KeyValue>,
    /// Every retained event, in commit order. Grows until compacted.
    history: Vec<Event>,
    /// Revisions of history kept by automatic compaction
    retention: Option<i64>,
    watchers: Vec<Watcher>,
    /// Failure returned by the next request
    injected: Option<ClientError>,
}

impl State {
    fn take_failure(&mut self) -> Result<(), ClientError> {
        match self.injected.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn header(&self) -> ResponseHeader {
        ResponseHeader {
            revision: self.revision,
        }
    }

    fn range(&self, key: &str) -> GetResponse {
        GetResponse {
            header: self.header(),
            kvs: self.kvs.get(key).cloned().into_iter().collect(),
        }
    }

    fn write(&mut self, key: &str, value: &str, revision: i64) -> Event {
        let kv = match self.kvs.get(key) {
            Some(existing) => KeyValue {
                key: key.to_string(),
                value: value.to_string(),
                create_revision: existing.create_revision,
                mod_revision: revision,
                version: existing.version + 1,
            },
            None => KeyValue {
                key: key.to_string(),
                value: value.to_string(),
                create_revision: revision,
                mod_revision: revision,
                version: 1,
            },
        };
        self.kvs.insert(key.to_string(), kv.clone());
        Event {
            kind: EventType::Put,
            kv,
        }
    }

    fn remove(&mut self, key: &str, revision: i64) -> Option<Event> {
        self.kvs.remove(key).map(|_| Event {
            kind: EventType::Delete,
            kv: KeyValue {
                key: key.to_string(),
                value: String::new(),
                create_revision: 0,
                mod_revision: revision,
                version: 0,
            },
        })
    }

    /// Apply one operation at the pending `revision`, collecting its events.
    fn apply(&mut self, op: &TxnOp, revision: i64, events: &mut Vec<Event>) -> TxnOpResponse {
        match op {
            TxnOp::Get { key } => TxnOpResponse::Get(self.range(key)),
            TxnOp::Put { key, value } => {
                events.push(self.write(key, value, revision));
                TxnOpResponse::Put(PutResponse {
                    header: ResponseHeader { revision },
                })
            }
            TxnOp::Delete { key } => match self.remove(key, revision) {
                Some(event) => {
                    events.push(event);
                    TxnOpResponse::Delete(DeleteResponse {
                        header: ResponseHeader { revision },
                        deleted: 1,
                    })
                }
                None => TxnOpResponse::Delete(DeleteResponse {
                    header: self.header(),
                    deleted: 0,
                }),
            },
        }
    }

    /// Make `events` visible at `revision` and fan them out to watchers.
    fn commit(&mut self, revision: i64, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        self.revision = revision;
        self.publish(&events);
        self.history.extend(events);
        if let Some(retention) = self.retention {
            self.compact_to(revision - retention);
        }
    }

    fn compact_to(&mut self, revision: i64) {
        let revision = revision.min(self.revision);
        if revision <= self.compacted {
            return;
        }
        self.history.retain(|event| event.kv.mod_revision > revision);
        self.compacted = revision;
        trace!(revision, "compacted history");
    }

    fn publish(&mut self, events: &[Event]) {
        let header = self.header();
        self.watchers.retain(|watcher| {
            let matching: Vec<Event> = events
                .iter()
                .filter(|event| event.kv.key == watcher.key)
                .cloned()
                .collect();
            if matching.is_empty() {
                return !watcher.tx.is_closed();
            }
            watcher
                .tx
                .send(Ok(WatchResponse {
                    header,
                    events: matching,
                }))
                .is_ok()
        });
    }
}

/// In-process revisioned key-value store.
///
/// Like a real store, history is retained until it is compacted, either by
/// calling [`MemoryClient::compact`] or by building the client with
/// [`MemoryClient::with_retention`]. Long-running users should pick one.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(MemoryClient::new());
/// let put = client.put("a", "1").await?;
/// assert_eq!(put.header.revision, 1);
/// ```
#[derive(Default)]
pub struct MemoryClient {
    state: Mutex<State>,
}

impl MemoryClient {
    /// Create an empty store at revision 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that keeps only the last `revisions` revisions
    /// of history, compacting older ones after every commit.
    ///
    /// Waits resolve their baseline and then watch from the next revision,
    /// so `revisions` must cover the store writes that can land in between.
    pub fn with_retention(revisions: i64) -> Self {
        let client = Self::new();
        client.state.lock().retention = Some(revisions.max(1));
        client
    }

    /// Current global revision.
    pub fn revision(&self) -> i64 {
        self.state.lock().revision
    }

    /// Number of watches still registered.
    pub fn watcher_count(&self) -> usize {
        let mut state = self.state.lock();
        state.watchers.retain(|watcher| !watcher.tx.is_closed());
        state.watchers.len()
    }

    /// Close every watch stream without delivering further events.
    pub fn cancel_watches(&self) {
        let mut state = self.state.lock();
        debug!(watchers = state.watchers.len(), "canceling all watches");
        state.watchers.clear();
    }

    /// Discard history at or below `revision`.
    ///
    /// Watches that start at a compacted revision fail inline with
    /// [`ClientError::Compacted`].
    pub fn compact(&self, revision: i64) {
        debug!(revision, "compacting history");
        self.state.lock().compact_to(revision);
    }

    /// Fail the next request with `err`.
    pub fn inject_failure(&self, err: ClientError) {
        self.state.lock().injected = Some(err);
    }
}

#[async_trait]
impl KvClient for MemoryClient {
    async fn get(&self, key: &str) -> Result<GetResponse, ClientError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        Ok(state.range(key))
    }

    async fn get_prefix(&self, prefix: &str) -> Result<GetResponse, ClientError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let kvs = state
            .kvs
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, kv)| kv.clone())
            .collect();
        Ok(GetResponse {
            header: state.header(),
            kvs,
        })
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutResponse, ClientError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let revision = state.revision + 1;
        let event = state.write(key, value, revision);
        state.commit(revision, vec![event]);
        trace!(key, revision, "put");
        Ok(PutResponse {
            header: state.header(),
        })
    }

    async fn delete(&self, key: &str) -> Result<DeleteResponse, ClientError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let revision = state.revision + 1;
        let events: Vec<Event> = state.remove(key, revision).into_iter().collect();
        let deleted = events.len() as i64;
        state.commit(revision, events);
        trace!(key, deleted, "delete");
        Ok(DeleteResponse {
            header: state.header(),
            deleted,
        })
    }

    async fn txn(&self, txn: TxnRequest) -> Result<TxnResponse, ClientError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let succeeded = txn
            .compare
            .iter()
            .all(|cmp| cmp.evaluate(state.kvs.get(&cmp.key)));
        let ops = if succeeded { &txn.success } else { &txn.failure };

        let revision = state.revision + 1;
        let mut events = Vec::new();
        let responses = ops
            .iter()
            .map(|op| state.apply(op, revision, &mut events))
            .collect();
        state.commit(revision, events);
        trace!(succeeded, revision = state.revision, "txn");

        Ok(TxnResponse {
            header: state.header(),
            succeeded,
            responses,
        })
    }

    async fn watch(&self, key: &str, start_revision: i64) -> Result<WatchStream, ClientError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let start = if start_revision <= 0 {
            state.revision + 1
        } else {
            start_revision
        };

        if start <= state.compacted {
            // Sender drops here, so the stream ends right after the error.
            let _ = tx.send(Err(ClientError::Compacted {
                revision: state.compacted,
            }));
            return Ok(WatchStream::new(rx));
        }

        let replay: Vec<Event> = state
            .history
            .iter()
            .filter(|event| event.kv.key == key && event.kv.mod_revision >= start)
            .cloned()
            .collect();
        if !replay.is_empty() {
            let _ = tx.send(Ok(WatchResponse {
                header: state.header(),
                events: replay,
            }));
        }

        state.watchers.push(Watcher {
            key: key.to_string(),
            tx,
        });
        trace!(key, start, "watch registered");
        Ok(WatchStream::new(rx))
    }
}
