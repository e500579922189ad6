// ABOUTME: Terminal errors raised by the bucket adapter.
// ABOUTME: Transient failures are retried first; these carry the key and attempt count.

use snafu::Snafu;

use super::backend::BackendError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("failed to retrieve {key} after {attempts} attempt(s): {source}"))]
    Get {
        key: String,
        attempts: usize,
        source: BackendError,
    },

    #[snafu(display("failed to store {key} after {attempts} attempt(s): {source}"))]
    Put {
        key: String,
        attempts: usize,
        source: BackendError,
    },

    #[snafu(display("failed to list {prefix} after {attempts} attempt(s): {source}"))]
    List {
        prefix: String,
        attempts: usize,
        source: BackendError,
    },

    #[snafu(display("failed to compress {key}: {source}"))]
    Compress {
        key: String,
        source: std::io::Error,
    },

    #[snafu(display("invalid gzip pattern '{pattern}': {source}"))]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[snafu(display("failed to connect to bucket {bucket}: {source}"))]
    Connect {
        bucket: String,
        source: object_store::Error,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// A storage request kept failing through the whole retry schedule.
    RetriesExhausted,
    /// Local encoding of an object failed.
    Encoding,
    /// The adapter could not be built from configuration.
    Setup,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Get { .. } | StoreError::Put { .. } | StoreError::List { .. } => {
                StoreErrorKind::RetriesExhausted
            }
            StoreError::Compress { .. } => StoreErrorKind::Encoding,
            StoreError::InvalidPattern { .. } | StoreError::Connect { .. } => {
                StoreErrorKind::Setup
            }
        }
    }

    /// Number of attempts made before giving up, for request failures.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            StoreError::Get { attempts, .. }
            | StoreError::Put { attempts, .. }
            | StoreError::List { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}
