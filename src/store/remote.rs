// ABOUTME: Backend implementation over the object_store crate.
// ABOUTME: Connects to S3 (or compatible endpoints) with public-read ACLs, or runs in memory.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use http::{HeaderMap, HeaderName, HeaderValue};
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{
    Attribute, AttributeValue, Attributes, ClientOptions, ObjectMeta, ObjectStore, PutOptions,
};
use snafu::ResultExt;

use super::backend::{Backend, BackendError, StoredObject};
use super::error::{ConnectSnafu, StoreError};
use crate::config::Credentials;

const ACL_HEADER: &str = "x-amz-acl";
const ACL_PUBLIC_READ: &str = "public-read";

/// [`Backend`] backed by any [`ObjectStore`].
#[derive(Clone)]
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for ObjectStoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreBackend")
            .field("store", &self.store.to_string())
            .finish()
    }
}

/// Connection settings for an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Settings<'a> {
    pub bucket: &'a str,
    pub region: &'a str,
    pub endpoint: Option<&'a str>,
    pub allow_http: bool,
    pub credentials: &'a Credentials,
}

impl ObjectStoreBackend {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()))
    }

    /// Connect to an S3 bucket. Every request carries a public-read canned ACL.
    ///
    /// Credentials not given explicitly fall back to the standard `AWS_*`
    /// environment variables.
    pub fn s3(settings: &S3Settings<'_>) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(ACL_HEADER),
            HeaderValue::from_static(ACL_PUBLIC_READ),
        );

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(settings.bucket)
            .with_region(settings.region)
            .with_allow_http(settings.allow_http)
            .with_client_options(ClientOptions::new().with_default_headers(headers));

        if let Some(endpoint) = settings.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(ref key) = settings.credentials.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(ref secret) = settings.credentials.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(ref token) = settings.credentials.session_token {
            builder = builder.with_token(token);
        }

        let store = builder.build().context(ConnectSnafu {
            bucket: settings.bucket,
        })?;
        Ok(Self::new(Arc::new(store)))
    }
}

/// The unencoded key for a stored location.
///
/// `Path::from` percent-encodes characters object_store reserves, so listed
/// locations are decoded back before they are handed out as keys.
fn raw_key(location: &Path) -> Result<String, BackendError> {
    location
        .parts()
        .map(|part| decode_part(part.as_ref()))
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.join("/"))
}

fn decode_part(part: &str) -> Result<String, BackendError> {
    urlencoding::decode(part)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| BackendError::Other(format!("undecodable key segment {part}: {e}")))
}

fn attribute(attributes: &Attributes, key: &Attribute) -> Option<String> {
    attributes.get(key).map(|value| {
        let value: &str = value.as_ref();
        value.to_string()
    })
}

fn insert_attribute(attributes: &mut Attributes, key: Attribute, value: &Option<String>) {
    if let Some(value) = value {
        attributes.insert(key, AttributeValue::from(value.clone()));
    }
}

#[async_trait]
impl Backend for ObjectStoreBackend {
    async fn get(&self, key: &str) -> Result<StoredObject, BackendError> {
        let result = self.store.get(&Path::from(key)).await?;
        let attributes = result.attributes.clone();
        let body = result.bytes().await?;

        Ok(StoredObject {
            body,
            content_type: attribute(&attributes, &Attribute::ContentType),
            content_encoding: attribute(&attributes, &Attribute::ContentEncoding),
            cache_control: attribute(&attributes, &Attribute::CacheControl),
        })
    }

    async fn put(&self, key: &str, object: StoredObject) -> Result<(), BackendError> {
        let mut attributes = Attributes::new();
        insert_attribute(&mut attributes, Attribute::ContentType, &object.content_type);
        insert_attribute(
            &mut attributes,
            Attribute::ContentEncoding,
            &object.content_encoding,
        );
        insert_attribute(&mut attributes, Attribute::CacheControl, &object.cache_control);

        let options = PutOptions {
            attributes,
            ..Default::default()
        };
        self.store
            .put_opts(&Path::from(key), object.body.into(), options)
            .await?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let prefix = Path::from(prefix);
        let objects: Vec<ObjectMeta> = self.store.list(Some(&prefix)).try_collect().await?;
        objects.iter().map(|meta| raw_key(&meta.location)).collect()
    }

    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        let prefix = Path::from(prefix);
        let listing = self.store.list_with_delimiter(Some(&prefix)).await?;
        listing
            .common_prefixes
            .iter()
            .filter_map(|path| path.filename())
            .map(decode_part)
            .collect()
    }
}
