// ABOUTME: The object store adapter: get/put/list against one bucket.
// ABOUTME: Applies retry, content type, gzip, and cache-control policy uniformly.

use std::sync::Arc;

use bytes::Bytes;
use snafu::ResultExt;

use super::backend::{Backend, BackendError, StoredObject};
use super::encoding::{CompressionPolicy, GZIP_ENCODING, content_type_for, gunzip, gzip};
use super::error::{CompressSnafu, GetSnafu, ListSnafu, PutSnafu, StoreError};
use super::retry::{GaveUp, RetryPolicy};
use crate::config::Config;
use crate::layout::KeyLayout;

/// How a fetched body was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoding {
    /// Stored without content encoding.
    Identity,
    /// Stored gzip-encoded and inflated.
    Gunzipped,
    /// Marked gzip-encoded but not a valid gzip stream; raw bytes returned.
    Corrupt,
}

/// A fetched object body, already decoded.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: Bytes,
    pub decoding: Decoding,
}

/// Per-put overrides of the bucket defaults.
#[derive(Debug, Clone, Default)]
pub struct PutOverrides {
    pub cache_control: Option<String>,
}

impl PutOverrides {
    pub fn cache_control(value: impl Into<String>) -> Self {
        Self {
            cache_control: Some(value.into()),
        }
    }
}

pub struct Bucket {
    backend: Arc<dyn Backend>,
    compression: CompressionPolicy,
    retry: RetryPolicy,
    cache_control: Option<String>,
}

impl std::fmt::Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("compression", &self.compression)
            .field("retry", &self.retry)
            .field("cache_control", &self.cache_control)
            .finish()
    }
}

impl Bucket {
    pub fn new(backend: Arc<dyn Backend>, compression: CompressionPolicy, retry: RetryPolicy) -> Self {
        Self {
            backend,
            compression,
            retry,
            cache_control: None,
        }
    }

    /// Cache-control header applied to every put without an override.
    pub fn with_cache_control(mut self, cache_control: Option<String>) -> Self {
        self.cache_control = cache_control;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the adapter with the configured gzip, retry, and cache-control policy.
    /// The current pointer key is always exempt from compression.
    pub fn for_config(backend: Arc<dyn Backend>, config: &Config) -> Result<Self, StoreError> {
        let layout = KeyLayout::from_config(config);
        let compression =
            CompressionPolicy::from_config(&config.gzip)?.exempt(layout.pointer_key());
        let retry = RetryPolicy::from_config(&config.retry);
        Ok(Self::new(backend, compression, retry).with_cache_control(config.cache_control.clone()))
    }

    /// Fetch and decode an object. A missing key is `None` and is not retried.
    pub async fn get(&self, key: &str) -> Result<Option<Fetched>, StoreError> {
        tracing::debug!("Retrieving {key}");

        let result = self
            .retry
            .run("get", key, || self.backend.get(key), BackendError::is_not_found)
            .await;

        let object = match result {
            Ok(object) => object,
            Err(GaveUp { error, .. }) if error.is_not_found() => return Ok(None),
            Err(GaveUp { attempts, error }) => {
                return Err(error).context(GetSnafu { key, attempts });
            }
        };

        Ok(Some(decode(key, object)))
    }

    /// Store `body` under `key` with the adapter's content policy.
    pub async fn put(
        &self,
        key: &str,
        body: Bytes,
        overrides: &PutOverrides,
    ) -> Result<(), StoreError> {
        let compress = self.compression.should_compress(key);
        tracing::debug!(compress, "Storing {key}");

        let body = if compress {
            Bytes::from(gzip(&body).context(CompressSnafu { key })?)
        } else {
            body
        };

        let object = StoredObject {
            body,
            content_type: Some(content_type_for(key).to_string()),
            content_encoding: compress.then(|| GZIP_ENCODING.to_string()),
            cache_control: overrides
                .cache_control
                .clone()
                .or_else(|| self.cache_control.clone()),
        };

        let result = self
            .retry
            .run("put", key, || self.backend.put(key, object.clone()), |_| false)
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(GaveUp { attempts, error }) => Err(error).context(PutSnafu { key, attempts }),
        }
    }

    /// Every key under `prefix`, sorted.
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = self.list("list", prefix, false).await?;
        keys.sort();
        Ok(keys)
    }

    /// Immediate child names under `prefix`, sorted.
    pub async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut names = self.list("list-prefixes", prefix, true).await?;
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn list(
        &self,
        operation: &str,
        prefix: &str,
        delimited: bool,
    ) -> Result<Vec<String>, StoreError> {
        tracing::debug!("Listing {prefix}");
        let result = self
            .retry
            .run(
                operation,
                prefix,
                || async {
                    if delimited {
                        self.backend.list_prefixes(prefix).await
                    } else {
                        self.backend.list_keys(prefix).await
                    }
                },
                |_| false,
            )
            .await;

        match result {
            Ok(keys) => Ok(keys),
            Err(GaveUp { attempts, error }) => Err(error).context(ListSnafu { prefix, attempts }),
        }
    }
}

fn decode(key: &str, object: StoredObject) -> Fetched {
    let gzipped = object
        .content_encoding
        .as_deref()
        .is_some_and(|enc| enc.eq_ignore_ascii_case(GZIP_ENCODING));

    if !gzipped {
        return Fetched {
            body: object.body,
            decoding: Decoding::Identity,
        };
    }

    match gunzip(&object.body) {
        Ok(inflated) => Fetched {
            body: Bytes::from(inflated),
            decoding: Decoding::Gunzipped,
        },
        Err(e) => {
            tracing::warn!("{key} is marked gzip but failed to decompress, using raw bytes: {e}");
            Fetched {
                body: object.body,
                decoding: Decoding::Corrupt,
            }
        }
    }
}
