//! Versioned key-value storage contract.
//!
//! This crate defines the backend-neutral surface:
//! - [`Storage`]: the async storage trait every backend implements
//! - [`Version`]: opaque, backend-produced version token
//! - [`Versioned`], [`StorageDetails`], [`ValueDetails`]: values and snapshots
//! - [`Error`] / [`Result`]: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod storage;
pub mod types;

pub use error::{BoxError, Error, Result};
pub use storage::Storage;
pub use types::{StorageDetails, ValueDetails, Version, Versioned};
