// ABOUTME: Error types for deployer operations.
// ABOUTME: Covers bad targets, failing hooks, and terminal storage, upload, and git failures.

use crate::hooks::HookPoint;
use crate::ledger::LedgerError;
use crate::scm::ScmError;
use crate::store::StoreError;
use crate::types::Revision;
use crate::upload::UploadError;

/// Errors that end a stage, switch, or deploy.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// No target revision was given, or it was blank.
    #[error("no revision specified")]
    MissingRevision,

    /// The target is neither a revision nor a recorded commit prefix.
    #[error("no revision matches '{0}'")]
    UnknownRevision(String),

    /// The revision has no objects under its prefix.
    #[error("revision {0} has not been staged")]
    RevisionNotStaged(Revision),

    /// An object listed under a revision disappeared before it was copied.
    #[error("object {0} disappeared during switch")]
    MissingObject(String),

    /// A `before-*` hook failed.
    #[error("{point} hook failed: {detail}")]
    HookFailed { point: HookPoint, detail: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("source control error: {0}")]
    Scm(#[from] ScmError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// The operator asked for something that cannot be resolved.
    InvalidTarget,
    /// A lifecycle hook vetoed the operation.
    Hook,
    /// Object storage failed after retries, or holds unexpected data.
    Storage,
    /// Local assets could not be read.
    Upload,
    /// Source control could not be queried.
    SourceControl,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::MissingRevision
            | DeployError::UnknownRevision(_)
            | DeployError::RevisionNotStaged(_) => DeployErrorKind::InvalidTarget,
            DeployError::HookFailed { .. } => DeployErrorKind::Hook,
            DeployError::MissingObject(_) | DeployError::Ledger(_) | DeployError::Store(_) => {
                DeployErrorKind::Storage
            }
            DeployError::Upload(UploadError::Store(_)) => DeployErrorKind::Storage,
            DeployError::Upload(_) => DeployErrorKind::Upload,
            DeployError::Scm(_) => DeployErrorKind::SourceControl,
        }
    }
}
