//! Request, response and event types of a revisioned key-value store.
//!
//! The store keeps one global revision that advances once per mutating
//! request. Each live key records three counters:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `create_revision` | global revision at which the key was (re)created |
//! | `mod_revision` | global revision of the latest write to the key |
//! | `version` | per-key write count since creation, 0 once deleted |
//!
//! Comparisons against a key that does not exist see 0 for every counter.

use serde::{Deserialize, Serialize};

/// A stored key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Full store key.
    pub key: String,
    /// Stored value, empty in delete events.
    pub value: String,
    /// Revision at which the key was last created.
    pub create_revision: i64,
    /// Revision of the latest write to the key.
    pub mod_revision: i64,
    /// Writes since creation.
    pub version: i64,
}

/// Header attached to every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Store revision when the request was served.
    pub revision: i64,
}

/// Result of a point or prefix read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    /// Revision the read was served at.
    pub header: ResponseHeader,
    /// Matching pairs, sorted by key.
    pub kvs: Vec<KeyValue>,
}

/// Result of a put.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    /// `header.revision` is the revision the write was committed at.
    pub header: ResponseHeader,
}

/// Result of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Revision of the delete, or the current revision if nothing was removed.
    pub header: ResponseHeader,
    /// Number of keys removed.
    pub deleted: i64,
}

/// Counter a [`Compare`] inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareTarget {
    /// `KeyValue::create_revision`
    CreateRevision,
    /// `KeyValue::mod_revision`
    ModRevision,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// `actual == operand`
    Equal,
    /// `actual != operand`
    NotEqual,
    /// `actual > operand`
    Greater,
    /// `actual < operand`
    Less,
}

/// One predicate of a transaction guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compare {
    /// Key whose counters are compared.
    pub key: String,
    /// Counter under test.
    pub target: CompareTarget,
    /// How the counter is compared.
    pub op: CompareOp,
    /// Right-hand side of the comparison.
    pub operand: i64,
}

impl Compare {
    /// Compare the key's creation revision.
    pub fn create_revision(key: impl Into<String>, op: CompareOp, operand: i64) -> Self {
        Self {
            key: key.into(),
            target: CompareTarget::CreateRevision,
            op,
            operand,
        }
    }

    /// Compare the key's modification revision.
    pub fn mod_revision(key: impl Into<String>, op: CompareOp, operand: i64) -> Self {
        Self {
            key: key.into(),
            target: CompareTarget::ModRevision,
            op,
            operand,
        }
    }

    /// Evaluate against the key's current pair, `None` if absent.
    pub fn evaluate(&self, kv: Option<&KeyValue>) -> bool {
        let actual = match (self.target, kv) {
            (CompareTarget::CreateRevision, Some(kv)) => kv.create_revision,
            (CompareTarget::ModRevision, Some(kv)) => kv.mod_revision,
            (_, None) => 0,
        };
        match self.op {
            CompareOp::Equal => actual == self.operand,
            CompareOp::NotEqual => actual != self.operand,
            CompareOp::Greater => actual > self.operand,
            CompareOp::Less => actual < self.operand,
        }
    }
}

/// Operation inside a transaction branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnOp {
    /// Read a single key.
    Get {
        /// Key to read.
        key: String,
    },
    /// Write a single key.
    Put {
        /// Key to write.
        key: String,
        /// New value.
        value: String,
    },
    /// Delete a single key.
    Delete {
        /// Key to delete.
        key: String,
    },
}

impl TxnOp {
    /// Read `key`.
    pub fn get(key: impl Into<String>) -> Self {
        TxnOp::Get { key: key.into() }
    }

    /// Write `value` under `key`.
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        TxnOp::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Delete `key`.
    pub fn delete(key: impl Into<String>) -> Self {
        TxnOp::Delete { key: key.into() }
    }
}

/// Response to one [`TxnOp`], in branch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxnOpResponse {
    /// Answer to [`TxnOp::Get`].
    Get(GetResponse),
    /// Answer to [`TxnOp::Put`].
    Put(PutResponse),
    /// Answer to [`TxnOp::Delete`].
    Delete(DeleteResponse),
}

impl TxnOpResponse {
    /// The read result, if this answers a get.
    pub fn into_get(self) -> Option<GetResponse> {
        match self {
            TxnOpResponse::Get(resp) => Some(resp),
            _ => None,
        }
    }

    /// The write result, if this answers a put.
    pub fn into_put(self) -> Option<PutResponse> {
        match self {
            TxnOpResponse::Put(resp) => Some(resp),
            _ => None,
        }
    }
}

/// Conditional transaction: if every compare holds run `success`, else `failure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnRequest {
    /// Guard predicates, all of which must hold.
    pub compare: Vec<Compare>,
    /// Branch run when the guard holds.
    pub success: Vec<TxnOp>,
    /// Branch run otherwise.
    pub failure: Vec<TxnOp>,
}

impl TxnRequest {
    /// Empty transaction: no guard, no operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add guard predicates. All must hold for the success branch.
    pub fn when(mut self, compares: impl IntoIterator<Item = Compare>) -> Self {
        self.compare.extend(compares);
        self
    }

    /// Operations run when the guard holds.
    pub fn and_then(mut self, ops: impl IntoIterator<Item = TxnOp>) -> Self {
        self.success.extend(ops);
        self
    }

    /// Operations run when the guard fails.
    pub fn or_else(mut self, ops: impl IntoIterator<Item = TxnOp>) -> Self {
        self.failure.extend(ops);
        self
    }
}

/// Result of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxnResponse {
    /// Revision after the transaction.
    pub header: ResponseHeader,
    /// Whether the guard held.
    pub succeeded: bool,
    /// Responses of the branch that ran.
    pub responses: Vec<TxnOpResponse>,
}

impl TxnResponse {
    /// Take the first response of the executed branch.
    pub fn into_first(self) -> Option<TxnOpResponse> {
        self.responses.into_iter().next()
    }
}

/// Kind of change an [`Event`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// The key was created or overwritten.
    Put,
    /// The key was deleted.
    Delete,
}

/// A single change to a key.
///
/// For deletes `kv.version` is 0, `kv.value` is empty and `kv.mod_revision`
/// is the revision of the delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Kind of change.
    pub kind: EventType,
    /// The pair as left by the change.
    pub kv: KeyValue,
}

/// One batch of events delivered by a watch, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchResponse {
    /// Store revision when the batch was sent.
    pub header: ResponseHeader,
    /// Changes to the watched key.
    pub events: Vec<Event>,
}
