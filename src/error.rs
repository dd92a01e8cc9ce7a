//! Error types for store operations.

use thiserror::Error;

use crate::registry::StoreId;

/// Errors returned by registries and stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A caller handed over a value of the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The registry has no entry under this identifier.
    #[error("{0} is not registered")]
    UnknownStore(StoreId),

    /// An asynchronous reducer failed before producing a state.
    #[error("reducer failed: {0}")]
    Reducer(#[from] anyhow::Error),
}

impl StoreError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument(message.into())
    }

    /// Whether this is a validation failure.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StoreError::InvalidArgument(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
