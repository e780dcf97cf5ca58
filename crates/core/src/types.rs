//! Value and version types shared by every storage backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque version token attached to a stored value.
///
/// Callers never interpret a version; they only hand it back to the
/// storage that produced it. For a given key a greater version always
/// denotes a more recent write, and a version is never reused after a
/// write. Absence of a value is expressed as `Option::<Version>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Build a version from a backend's native counter.
    ///
    /// Intended for storage backends only.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// The backend's native counter.
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned {
    /// The stored value
    pub value: String,
    /// Version of the stored value
    pub version: Version,
}

impl Versioned {
    /// Create a new versioned value.
    pub fn new(value: impl Into<String>, version: Version) -> Self {
        Self {
            value: value.into(),
            version,
        }
    }
}

/// A live entry as reported by [`crate::Storage::inspect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDetails {
    /// The stored value
    pub value: String,
    /// Version of the stored value
    pub version: Version,
}

/// Snapshot of everything a storage handle manages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDetails {
    /// Whether the handle has been closed
    pub is_closed: bool,
    /// Live entries keyed by logical key
    pub values: BTreeMap<String, ValueDetails>,
}

impl StorageDetails {
    /// Details reported by a closed handle.
    pub fn closed() -> Self {
        Self {
            is_closed: true,
            values: BTreeMap::new(),
        }
    }
}
