//! Transaction guards, phrased in terms of the two revision counters.
//!
//! A key that never existed, or was deleted and not re-created, reports a
//! creation revision of 0. A live key reports the revision of its latest
//! write as its modification revision, which doubles as its [`Version`].

use versionedkv_coordination::{Compare, CompareOp};
use versionedkv_core::Version;

/// The key does not currently exist.
pub(crate) fn absent(full_key: &str) -> Compare {
    Compare::create_revision(full_key, CompareOp::Equal, 0)
}

/// The key exists at some version.
pub(crate) fn present(full_key: &str) -> Compare {
    Compare::create_revision(full_key, CompareOp::Greater, 0)
}

/// The key exists at exactly `version`.
pub(crate) fn at_version(full_key: &str, version: Version) -> Compare {
    Compare::mod_revision(full_key, CompareOp::Equal, version.raw())
}

/// The key exists at a version other than `version`.
pub(crate) fn moved_from(full_key: &str, version: Version) -> [Compare; 2] {
    [
        present(full_key),
        Compare::mod_revision(full_key, CompareOp::NotEqual, version.raw()),
    ]
}

/// Upsert pinned at `expected` lost to another writer.
///
/// The write must run only when this guard does NOT hold: an absent key is
/// created, a key still at `expected` is overwritten.
pub(crate) fn conflict_detected(full_key: &str, expected: Version) -> [Compare; 2] {
    moved_from(full_key, expected)
}
