//! Error types for versioned storage.
//!
//! Only real failures are errors. "Nothing happened because the stored
//! state did not match the request" (absent key, version mismatch, delete
//! of a missing key) is reported through `Option`/`bool` return values.

use thiserror::Error;

/// Boxed error raised by a storage backend's underlying client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All versioned storage errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The storage handle has been closed.
    ///
    /// Returned by every operation on a closed handle, by a second call to
    /// `close`, and by waits released because the handle was closed.
    #[error("storage already closed")]
    StorageClosed,

    /// A blocking wait ended because its change stream closed before
    /// delivering any event.
    #[error("operation canceled")]
    Canceled,

    /// Failure surfaced by the backend's client, passed through unchanged.
    #[error("{0}")]
    Backend(#[source] BoxError),
}

/// Result type for versioned storage operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a backend client error without altering it.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Backend(err.into())
    }

    /// Check if this is the closed-handle sentinel.
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::StorageClosed)
    }

    /// Check if this is a canceled wait.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Error::Canceled)
    }

    /// Borrow the backend error as a concrete type, if it is one.
    pub fn downcast_backend_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Backend(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}
