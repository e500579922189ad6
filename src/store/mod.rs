// ABOUTME: Object storage adapter with retry, compression, and content typing.
// ABOUTME: Exports the Backend seam, the object_store implementation, and the Bucket adapter.

mod backend;
mod bucket;
mod encoding;
mod error;
mod remote;
mod retry;

pub use backend::{Backend, BackendError, StoredObject};
pub use bucket::{Bucket, Decoding, Fetched, PutOverrides};
pub use encoding::{
    CompressionPolicy, DEFAULT_CONTENT_TYPE, GZIP_ENCODING, content_type_for, gunzip, gzip,
};
pub use error::{StoreError, StoreErrorKind};
pub use remote::{ObjectStoreBackend, S3Settings};
pub use retry::{GaveUp, RetryPolicy};
