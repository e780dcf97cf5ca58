//! Errors raised by a coordination-store client.

use thiserror::Error;

/// Failure surfaced by a [`crate::KvClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The store could not be reached or refused the request.
    #[error("store unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },

    /// A watch asked for history that has already been compacted away.
    #[error("required revision {revision} has been compacted")]
    Compacted {
        /// Compaction revision of the store.
        revision: i64,
    },

    /// The store canceled a watch.
    #[error("watch canceled: {reason}")]
    WatchCanceled {
        /// Reason given by the store.
        reason: String,
    },

    /// The request was malformed.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with it.
        reason: String,
    },
}
