// ABOUTME: Error types for revision ledger operations.
// ABOUTME: Storage failures pass through; a malformed pointer is reported explicitly.

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The pointer object exists but does not hold a revision identifier.
    #[error("current revision pointer {key} holds an invalid revision: {value:?}")]
    InvalidPointer { key: String, value: String },
}
