//! Blocking wait for a value to move away from a known version.
//!
//! ```text
//! resolve baseline ──changed──────────────────────────▶ return current
//!        │
//!        └─unchanged─▶ arm watch at baseline + 1 ─▶ race ─┬─ closure fired ─▶ StorageClosed
//!                                                          ├─ stream ended  ─▶ Canceled
//!                                                          ├─ stream error  ─▶ error as is
//!                                                          └─ batch ─▶ resolved? return : keep racing
//! ```
//!
//! The watch starts one revision past the baseline, so a change committed
//! between resolving the baseline and arming the watch is replayed rather
//! than missed. The watch registration is dropped on every exit path.

use crate::predicates::moved_from;
use crate::storage::{versioned, EtcdStorage};
use tracing::{debug, trace};
use versionedkv_coordination::{Event, KvClient, TxnOp, TxnOpResponse, TxnRequest};
use versionedkv_core::{Error, Result, Version, Versioned};

/// What the caller last saw under the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Baseline {
    /// No value, as of store revision `revision`.
    Absent { revision: i64 },
    /// A value at `Version`.
    At(Version),
}

/// Result of checking the store before watching.
enum Resolution {
    /// Already differs from what the caller knows.
    Changed(Versioned),
    Unchanged(Baseline),
}

/// Result of applying one watch batch to a baseline.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BatchOutcome {
    /// The wait is over; `None` means the key was deleted.
    Resolved(Option<Versioned>),
    /// Nothing in the batch answers the wait.
    Pending,
}

impl Baseline {
    /// First revision the watch must observe.
    pub(crate) fn watch_start(self) -> i64 {
        match self {
            Baseline::Absent { revision } => revision + 1,
            Baseline::At(version) => version.raw() + 1,
        }
    }

    /// Judge a batch, newest event first.
    ///
    /// The newest event is authoritative. Waiting on an absent key, deletes
    /// are skipped until a live event is found. Waiting on a version, the
    /// newest event decides alone: a delete resolves to `None`.
    pub(crate) fn resolve(self, events: Vec<Event>) -> BatchOutcome {
        let mut newest_first = events.into_iter().rev();
        match self {
            Baseline::Absent { .. } => newest_first
                .find(|event| event.kv.version >= 1)
                .map(|event| BatchOutcome::Resolved(Some(versioned(event.kv))))
                .unwrap_or(BatchOutcome::Pending),
            Baseline::At(_) => match newest_first.next() {
                Some(event) if event.kv.version == 0 => BatchOutcome::Resolved(None),
                Some(event) => BatchOutcome::Resolved(Some(versioned(event.kv))),
                None => BatchOutcome::Pending,
            },
        }
    }
}

impl<C: KvClient> EtcdStorage<C> {
    pub(crate) async fn wait(
        &self,
        key: &str,
        version: Option<Version>,
    ) -> Result<Option<Versioned>> {
        self.gate.check()?;
        let full_key = self.keys.full_key(key);

        let baseline = match self.resolve_baseline(&full_key, version).await? {
            Resolution::Changed(current) => {
                trace!(key, version = %current.version, "value already changed");
                return Ok(Some(current));
            }
            Resolution::Unchanged(baseline) => baseline,
        };

        let start = baseline.watch_start();
        let mut stream = self
            .client
            .watch(&full_key, start)
            .await
            .map_err(Error::backend)?;
        trace!(key, ?baseline, start, "watch armed");

        loop {
            tokio::select! {
                biased;

                _ = self.gate.closure().cancelled() => {
                    debug!(key, "wait released by close");
                    return Err(Error::StorageClosed);
                }
                item = stream.next() => {
                    let batch = match item {
                        Some(Ok(batch)) => batch,
                        Some(Err(err)) => return Err(Error::backend(err)),
                        None => {
                            debug!(key, "watch stream ended");
                            return Err(Error::Canceled);
                        }
                    };
                    trace!(
                        key,
                        events = batch.events.len(),
                        revision = batch.header.revision,
                        "watch batch"
                    );
                    if let BatchOutcome::Resolved(value) = baseline.resolve(batch.events) {
                        return Ok(value);
                    }
                }
            }
        }
    }

    async fn resolve_baseline(
        &self,
        full_key: &str,
        version: Option<Version>,
    ) -> Result<Resolution> {
        let Some(version) = version else {
            let resp = self.client.get(full_key).await.map_err(Error::backend)?;
            return Ok(match resp.kvs.into_iter().next() {
                Some(kv) => Resolution::Changed(versioned(kv)),
                None => Resolution::Unchanged(Baseline::Absent {
                    revision: resp.header.revision,
                }),
            });
        };

        let txn = TxnRequest::new()
            .when(moved_from(full_key, version))
            .and_then([TxnOp::get(full_key)]);
        let resp = self.client.txn(txn).await.map_err(Error::backend)?;
        if resp.succeeded {
            let current = resp
                .into_first()
                .and_then(TxnOpResponse::into_get)
                .and_then(|get| get.kvs.into_iter().next());
            if let Some(kv) = current {
                return Ok(Resolution::Changed(versioned(kv)));
            }
        }
        Ok(Resolution::Unchanged(Baseline::At(version)))
    }
}
