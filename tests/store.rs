// ABOUTME: Integration tests for the bucket adapter.
// ABOUTME: Retry accounting, transparent compression, and object metadata.

mod support;

use bytes::Bytes;
use s3_deployer::store::{
    CompressionPolicy, DEFAULT_CONTENT_TYPE, Decoding, PutOverrides, StoreErrorKind, StoredObject,
    gzip,
};
use support::{InstrumentedBackend, Op, bucket};

#[tokio::test]
async fn missing_key_is_none_without_retrying() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());

    let fetched = bucket.get("app/CURRENT_REVISION").await.unwrap();

    assert!(fetched.is_none());
    assert_eq!(backend.calls(Op::Get), 1);
}

#[tokio::test]
async fn put_succeeds_after_two_failures() {
    support::init_tracing();
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());
    backend.fail_next(Op::Put, 2);

    bucket
        .put("app/index.html", Bytes::from_static(b"<h>hi</h>"), &PutOverrides::default())
        .await
        .unwrap();

    assert_eq!(backend.calls(Op::Put), 3);
    let stored = backend.raw("app/index.html").await.unwrap();
    assert_eq!(stored.body, Bytes::from_static(b"<h>hi</h>"));
}

#[tokio::test]
async fn put_gives_up_after_four_attempts() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());
    backend.fail_next(Op::Put, 4);

    let err = bucket
        .put("app/index.html", Bytes::from_static(b"x"), &PutOverrides::default())
        .await
        .unwrap_err();

    assert_eq!(backend.calls(Op::Put), 4);
    assert_eq!(err.kind(), StoreErrorKind::RetriesExhausted);
    assert_eq!(err.attempts(), Some(4));
    assert!(backend.raw("app/index.html").await.is_none());
}

#[tokio::test]
async fn get_retries_transient_failures() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());
    backend
        .seed("app/SHAS", StoredObject {
            body: Bytes::from_static(b"abc - 20240101120000\n"),
            ..Default::default()
        })
        .await;
    backend.fail_next(Op::Get, 3);

    let fetched = bucket.get("app/SHAS").await.unwrap().unwrap();

    assert_eq!(backend.calls(Op::Get), 4);
    assert_eq!(fetched.body, Bytes::from_static(b"abc - 20240101120000\n"));
}

#[tokio::test]
async fn compression_is_transparent_to_readers() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::always());
    let body = Bytes::from("body { color: red; }\n".repeat(50));

    bucket
        .put("app/a/b.css", body.clone(), &PutOverrides::default())
        .await
        .unwrap();

    let stored = backend.raw("app/a/b.css").await.unwrap();
    assert_eq!(stored.content_encoding.as_deref(), Some("gzip"));
    assert_ne!(stored.body, body);

    let fetched = bucket.get("app/a/b.css").await.unwrap().unwrap();
    assert_eq!(fetched.body, body);
    assert_eq!(fetched.decoding, Decoding::Gunzipped);
}

#[tokio::test]
async fn pattern_mode_compresses_only_matching_keys() {
    let backend = InstrumentedBackend::new();
    let policy = CompressionPolicy::matching([r"\.js$"]).unwrap();
    let bucket = bucket(&backend, policy);

    for key in ["app/app.js", "app/logo.png"] {
        bucket
            .put(key, Bytes::from_static(b"data"), &PutOverrides::default())
            .await
            .unwrap();
    }

    let js = backend.raw("app/app.js").await.unwrap();
    let png = backend.raw("app/logo.png").await.unwrap();
    assert_eq!(js.content_encoding.as_deref(), Some("gzip"));
    assert_eq!(png.content_encoding, None);
    assert_eq!(png.body, Bytes::from_static(b"data"));
}

#[tokio::test]
async fn corrupt_gzip_falls_back_to_raw_bytes() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());
    backend
        .seed("app/broken.js", StoredObject {
            body: Bytes::from_static(b"definitely not gzip"),
            content_encoding: Some("gzip".to_string()),
            ..Default::default()
        })
        .await;

    let fetched = bucket.get("app/broken.js").await.unwrap().unwrap();

    assert_eq!(fetched.decoding, Decoding::Corrupt);
    assert_eq!(fetched.body, Bytes::from_static(b"definitely not gzip"));
}

#[tokio::test]
async fn truncated_gzip_falls_back_to_raw_bytes() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());
    let compressed = gzip(b"some longer content that compresses").unwrap();
    let truncated = Bytes::copy_from_slice(&compressed[..compressed.len() / 2]);
    backend
        .seed("app/half.js", StoredObject {
            body: truncated.clone(),
            content_encoding: Some("gzip".to_string()),
            ..Default::default()
        })
        .await;

    let fetched = bucket.get("app/half.js").await.unwrap().unwrap();
    assert_eq!(fetched.decoding, Decoding::Corrupt);
    assert_eq!(fetched.body, truncated);
}

#[tokio::test]
async fn content_type_follows_extension() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());

    for key in ["app/index.html", "app/style.css", "app/blob.unknownext", "app/SHAS"] {
        bucket
            .put(key, Bytes::from_static(b"x"), &PutOverrides::default())
            .await
            .unwrap();
    }

    let content_type = |object: StoredObject| object.content_type.unwrap();
    assert_eq!(content_type(backend.raw("app/index.html").await.unwrap()), "text/html");
    assert_eq!(content_type(backend.raw("app/style.css").await.unwrap()), "text/css");
    assert_eq!(
        content_type(backend.raw("app/blob.unknownext").await.unwrap()),
        DEFAULT_CONTENT_TYPE
    );
    assert_eq!(content_type(backend.raw("app/SHAS").await.unwrap()), DEFAULT_CONTENT_TYPE);
}

#[tokio::test]
async fn cache_control_override_beats_default() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never())
        .with_cache_control(Some("public, max-age=300".to_string()));

    bucket
        .put("app/a.js", Bytes::from_static(b"x"), &PutOverrides::default())
        .await
        .unwrap();
    bucket
        .put("app/b.js", Bytes::from_static(b"x"), &PutOverrides::cache_control("no-cache"))
        .await
        .unwrap();

    let a = backend.raw("app/a.js").await.unwrap();
    let b = backend.raw("app/b.js").await.unwrap();
    assert_eq!(a.cache_control.as_deref(), Some("public, max-age=300"));
    assert_eq!(b.cache_control.as_deref(), Some("no-cache"));
}

#[tokio::test]
async fn pointer_key_is_never_compressed() {
    let backend = InstrumentedBackend::new();
    let config = support::test_config("gzip: true\n");
    let bucket = s3_deployer::store::Bucket::for_config(std::sync::Arc::new(backend.clone()), &config)
        .unwrap();

    bucket
        .put("app/CURRENT_REVISION", Bytes::from_static(b"20240101120000"), &PutOverrides::default())
        .await
        .unwrap();
    bucket
        .put("app/current/index.html", Bytes::from_static(b"<h>hi</h>"), &PutOverrides::default())
        .await
        .unwrap();

    let pointer = backend.raw("app/CURRENT_REVISION").await.unwrap();
    assert_eq!(pointer.content_encoding, None);
    assert_eq!(pointer.body, Bytes::from_static(b"20240101120000"));

    let live = backend.raw("app/current/index.html").await.unwrap();
    assert_eq!(live.content_encoding.as_deref(), Some("gzip"));
}

#[tokio::test]
async fn list_failures_are_retried_then_reported() {
    let backend = InstrumentedBackend::new();
    let bucket = bucket(&backend, CompressionPolicy::never());
    backend.fail_next(Op::ListPrefixes, 4);

    let err = bucket.list_prefixes("app/revisions").await.unwrap_err();

    assert_eq!(backend.calls(Op::ListPrefixes), 4);
    assert!(err.to_string().contains("app/revisions"), "{err}");
}
