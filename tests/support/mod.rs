// ABOUTME: Test support utilities.
// ABOUTME: Instrumented in-memory bucket, fake source control, and recording hooks.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use parking_lot::Mutex;
use s3_deployer::config::Config;
use s3_deployer::deploy::Deployer;
use s3_deployer::hooks::{HookContext, HookPoint, HookResult, LifecycleHooks};
use s3_deployer::scm::{ScmError, SourceControl};
use s3_deployer::store::{
    Backend, BackendError, Bucket, CompressionPolicy, ObjectStoreBackend, RetryPolicy,
    StoredObject,
};
use s3_deployer::types::CommitId;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("s3_deployer=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Operations the instrumented backend counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Put,
    ListKeys,
    ListPrefixes,
}

#[derive(Default)]
struct Script {
    calls: HashMap<Op, usize>,
    failures: HashMap<Op, usize>,
}

/// In-memory backend that counts calls and can fail on demand.
#[derive(Clone)]
pub struct InstrumentedBackend {
    inner: ObjectStoreBackend,
    script: Arc<Mutex<Script>>,
}

impl InstrumentedBackend {
    pub fn new() -> Self {
        Self {
            inner: ObjectStoreBackend::in_memory(),
            script: Arc::default(),
        }
    }

    /// Make the next `times` calls of `op` fail with a transient error.
    pub fn fail_next(&self, op: Op, times: usize) {
        self.script.lock().failures.insert(op, times);
    }

    pub fn calls(&self, op: Op) -> usize {
        self.script.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.script.lock().calls.values().sum()
    }

    pub fn reset_calls(&self) {
        self.script.lock().calls.clear();
    }

    /// Read an object without going through the instrumentation.
    pub async fn raw(&self, key: &str) -> Option<StoredObject> {
        self.inner.get(key).await.ok()
    }

    /// Write an object without going through the instrumentation.
    pub async fn seed(&self, key: &str, object: StoredObject) {
        self.inner.put(key, object).await.unwrap();
    }

    fn enter(&self, op: Op) -> Result<(), BackendError> {
        let mut script = self.script.lock();
        *script.calls.entry(op).or_default() += 1;
        match script.failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(BackendError::Other(format!("injected {op:?} failure")))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for InstrumentedBackend {
    async fn get(&self, key: &str) -> Result<StoredObject, BackendError> {
        self.enter(Op::Get)?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, object: StoredObject) -> Result<(), BackendError> {
        self.enter(Op::Put)?;
        self.inner.put(key, object).await
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        self.enter(Op::ListKeys)?;
        self.inner.list_keys(prefix).await
    }

    async fn list_prefixes(&self, prefix: &str) -> Result<Vec<String>, BackendError> {
        self.enter(Op::ListPrefixes)?;
        self.inner.list_prefixes(prefix).await
    }
}

/// Bucket over `backend` with three immediate retries.
pub fn bucket(backend: &InstrumentedBackend, compression: CompressionPolicy) -> Bucket {
    Bucket::new(
        Arc::new(backend.clone()),
        compression,
        RetryPolicy::immediate(3),
    )
}

/// Source control with a fixed head and canned summaries.
#[derive(Default, Clone)]
pub struct FakeScm {
    head: Arc<Mutex<Option<CommitId>>>,
    summaries: Arc<Mutex<HashMap<String, String>>>,
    log_calls: Arc<Mutex<Vec<(CommitId, CommitId)>>>,
}

impl FakeScm {
    pub fn at(commit: &str) -> Self {
        let scm = Self::default();
        scm.set_head(commit);
        scm
    }

    pub fn set_head(&self, commit: &str) {
        *self.head.lock() = Some(CommitId::new(commit).unwrap());
    }

    pub fn set_summary(&self, commit: &str, summary: &str) {
        self.summaries
            .lock()
            .insert(commit.to_string(), summary.to_string());
    }

    pub fn log_calls(&self) -> Vec<(CommitId, CommitId)> {
        self.log_calls.lock().clone()
    }
}

#[async_trait]
impl SourceControl for FakeScm {
    async fn current_commit_id(&self) -> Result<CommitId, ScmError> {
        self.head.lock().clone().ok_or_else(|| ScmError::CommandFailed {
            command: "git rev-parse HEAD".to_string(),
            stderr: "not a git repository".to_string(),
        })
    }

    async fn log_summaries(
        &self,
        from: &CommitId,
        to: &CommitId,
    ) -> Result<Vec<String>, ScmError> {
        self.log_calls.lock().push((from.clone(), to.clone()));
        Ok(vec![
            format!("{} newest", to.short()),
            format!("{} after {}", to.short(), from.short()),
        ])
    }

    async fn commit_summary(&self, commit: &CommitId) -> Result<Option<String>, ScmError> {
        Ok(self.summaries.lock().get(commit.as_str()).cloned())
    }
}

/// Hooks that record every call and fail at chosen points.
#[derive(Default, Clone)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<(HookPoint, HookContext)>>>,
    failing: Arc<Mutex<Vec<HookPoint>>>,
}

impl RecordingHooks {
    pub fn fail_at(&self, point: HookPoint) {
        self.failing.lock().push(point);
    }

    pub fn points(&self) -> Vec<HookPoint> {
        self.calls.lock().iter().map(|(point, _)| *point).collect()
    }

    pub fn context_at(&self, point: HookPoint) -> Option<HookContext> {
        self.calls
            .lock()
            .iter()
            .find(|(p, _)| *p == point)
            .map(|(_, context)| context.clone())
    }
}

#[async_trait]
impl LifecycleHooks for RecordingHooks {
    async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        self.calls.lock().push((point, context.clone()));
        let success = !self.failing.lock().contains(&point);
        Some(HookResult {
            success,
            exit_code: Some(if success { 0 } else { 1 }),
            stdout: String::new(),
            stderr: if success {
                String::new()
            } else {
                format!("{point} refused")
            },
        })
    }
}

pub fn test_config(extra: &str) -> Config {
    Config::from_yaml(&format!("bucket: test-bucket\napp_path: app\n{extra}")).unwrap()
}

pub fn write_assets(dir: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// A deployer over an instrumented in-memory bucket reading assets from `source_dir`.
pub fn deployer(
    backend: &InstrumentedBackend,
    config: &Config,
    source_dir: &Path,
    scm: FakeScm,
    hooks: RecordingHooks,
) -> Deployer<FakeScm, RecordingHooks> {
    let bucket = Bucket::for_config(Arc::new(backend.clone()), config)
        .unwrap()
        .with_retry(RetryPolicy::immediate(3));
    Deployer::new(config, bucket, scm, hooks).with_source_dir(source_dir)
}
