// ABOUTME: Raw object storage capability used by the bucket adapter.
// ABOUTME: Implementations only move bytes and metadata; retry and encoding live above.

use async_trait::async_trait;
use bytes::Bytes;

/// An object body with the metadata written alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub cache_control: Option<String>,
}

/// Errors from a single storage request.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    ObjectStore(object_store::Error),

    #[error("storage request failed: {0}")]
    Other(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

impl From<object_store::Error> for BackendError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => BackendError::NotFound(path),
            other => BackendError::ObjectStore(other),
        }
    }
}

/// Get, put, and list against a single bucket.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch an object. Missing keys return [`BackendError::NotFound`].
    async fn get(&self, key: &str) -> Result<StoredObject, BackendError>;

    /// Write an object, replacing any existing one.
    async fn put(&self, key: &str, object: StoredObject) -> Result<(), BackendError>;

    /// Every object key under `prefix`, at any depth.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BackendError>;

    /// Names of the immediate child prefixes under `prefix` (delimiter `/`).
    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, BackendError>;
}
