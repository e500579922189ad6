// ABOUTME: The deployment orchestrator: stage, switch, deploy, and history queries.
// ABOUTME: Holds no revision state of its own; every call derives it from the bucket.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono_tz::Tz;
use futures::{StreamExt, TryStreamExt, stream};

use super::error::DeployError;
use super::report::{CurrentRevision, DeployReport, RevisionEntry, StageReport, SwitchReport};
use crate::config::Config;
use crate::diagnostics::{Diagnostics, Warning};
use crate::hooks::{HookContext, HookPoint, HookResult, LifecycleHooks};
use crate::layout::KeyLayout;
use crate::ledger::{Ledger, LedgerError};
use crate::scm::SourceControl;
use crate::store::{Bucket, Decoding, PutOverrides};
use crate::types::{CommitId, Revision};
use crate::upload::stage_files;

pub struct Deployer<C, H> {
    bucket: Arc<Bucket>,
    ledger: Ledger,
    layout: KeyLayout,
    source_dir: PathBuf,
    time_zone: Tz,
    concurrency: usize,
    scm: C,
    hooks: H,
}

impl<C: SourceControl, H: LifecycleHooks> Deployer<C, H> {
    pub fn new(config: &Config, bucket: Bucket, scm: C, hooks: H) -> Self {
        let bucket = Arc::new(bucket);
        let layout = KeyLayout::from_config(config);
        Self {
            ledger: Ledger::new(Arc::clone(&bucket), layout.clone()),
            bucket,
            layout,
            source_dir: config.dist_dir.clone(),
            time_zone: config.time_zone,
            concurrency: config.concurrency,
            scm,
            hooks,
        }
    }

    /// Read assets from `dir` instead of the configured `dist_dir`.
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = dir.into();
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Upload the source directory as `revision`, or as a new revision
    /// stamped with the current time in the configured time zone.
    ///
    /// Re-staging an existing revision overwrites its files.
    pub async fn stage(
        &self,
        revision: Option<Revision>,
        diag: &mut Diagnostics,
    ) -> Result<StageReport, DeployError> {
        let revision = revision.unwrap_or_else(|| Revision::now_in(self.time_zone));
        let context = HookContext::new(self.layout.app_path(), &revision);

        self.fire(HookPoint::BeforeStage, &context, diag).await?;

        tracing::info!("Staging revision {revision}");
        let summary = stage_files(
            &self.bucket,
            &self.layout,
            &revision,
            &self.source_dir,
            self.concurrency,
        )
        .await?;

        let commit = match self.scm.current_commit_id().await {
            Ok(commit) => {
                self.ledger.record_sha(&revision, &commit).await?;
                Some(commit)
            }
            Err(e) => {
                diag.warn(Warning::commit_unavailable(format!(
                    "Could not determine commit for revision {revision}, not recording it: {e}"
                )));
                None
            }
        };

        self.fire(HookPoint::AfterStage, &context, diag).await?;

        Ok(StageReport {
            revision,
            files: summary.files,
            bytes: summary.bytes,
            commit,
        })
    }

    /// Make a staged revision live. `target` is a revision identifier or a
    /// prefix of a recorded commit id.
    ///
    /// Live objects are overwritten one at a time; the pointer is written
    /// only after every copy has succeeded.
    pub async fn switch(
        &self,
        target: Option<&str>,
        diag: &mut Diagnostics,
    ) -> Result<SwitchReport, DeployError> {
        let target = target.map(str::trim).unwrap_or_default();
        if target.is_empty() {
            return Err(DeployError::MissingRevision);
        }

        let revision = self
            .ledger
            .normalize(target)
            .await?
            .ok_or_else(|| DeployError::UnknownRevision(target.to_string()))?;

        let keys = self
            .bucket
            .list_keys(&format!("{}/", self.layout.revision_prefix(&revision)))
            .await?;
        if keys.is_empty() {
            return Err(DeployError::RevisionNotStaged(revision));
        }

        let previous = self.live_revision(diag).await?;
        let context =
            HookContext::new(self.layout.app_path(), &revision).with_previous(previous.as_ref());

        self.fire(HookPoint::BeforeSwitch, &context, diag).await?;

        match &previous {
            Some(previous) => tracing::info!("Switching from {previous} to {revision}"),
            None => tracing::info!("Switching to {revision}"),
        }

        let decodings: Vec<(String, Decoding)> = stream::iter(keys.iter())
            .map(|key| self.copy_to_live(&revision, key))
            .buffer_unordered(self.concurrency.max(1))
            .try_collect()
            .await?;

        for (key, decoding) in &decodings {
            if *decoding == Decoding::Corrupt {
                diag.warn(Warning::corrupt_object(format!(
                    "{key} is marked gzip but could not be decompressed; copied raw bytes"
                )));
            }
        }

        self.ledger.set_current_revision(&revision).await?;

        self.fire(HookPoint::AfterSwitch, &context, diag).await?;

        Ok(SwitchReport {
            previous,
            revision,
            copied: decodings.len(),
        })
    }

    /// Stage then switch to the same revision.
    pub async fn deploy(
        &self,
        revision: Option<Revision>,
        diag: &mut Diagnostics,
    ) -> Result<DeployReport, DeployError> {
        let revision = revision.unwrap_or_else(|| Revision::now_in(self.time_zone));
        let context = HookContext::new(self.layout.app_path(), &revision);

        self.fire(HookPoint::BeforeDeploy, &context, diag).await?;

        let stage = self.stage(Some(revision.clone()), diag).await?;
        let switch = self.switch(Some(revision.as_str()), diag).await?;

        self.fire(HookPoint::AfterDeploy, &context, diag).await?;

        Ok(DeployReport { stage, switch })
    }

    /// The live revision and its timestamp.
    pub async fn current(&self) -> Result<CurrentRevision, DeployError> {
        Ok(CurrentRevision::new(self.ledger.current_revision().await?))
    }

    /// Every staged revision, oldest first, with commit details.
    pub async fn list(&self, diag: &mut Diagnostics) -> Result<Vec<RevisionEntry>, DeployError> {
        let revisions = self.ledger.list_revisions().await?;
        let record = self.ledger.record().await?;
        let current = self.live_revision(diag).await?;

        let mut entries = Vec::with_capacity(revisions.len());
        for revision in revisions {
            let commit = record.get(&revision).cloned();
            let summary = match &commit {
                Some(commit) => self.summary_of(commit, diag).await,
                None => None,
            };
            entries.push(RevisionEntry {
                timestamp: revision.timestamp(),
                current: current.as_ref() == Some(&revision),
                revision,
                commit,
                summary,
            });
        }
        Ok(entries)
    }

    /// One-line summaries of the commits between two revisions.
    ///
    /// Either side may be a revision identifier or a commit prefix. The
    /// result is empty when either side has no recorded commit.
    pub async fn changes(&self, from: &str, to: &str) -> Result<Vec<String>, DeployError> {
        let (Some(from), Some(to)) = (self.commit_for(from).await?, self.commit_for(to).await?)
        else {
            return Ok(Vec::new());
        };
        Ok(self.scm.log_summaries(&from, &to).await?)
    }

    async fn commit_for(&self, input: &str) -> Result<Option<CommitId>, DeployError> {
        let Some(revision) = self.ledger.normalize(input).await? else {
            return Ok(None);
        };
        Ok(self.ledger.sha_of(&revision).await?)
    }

    async fn summary_of(&self, commit: &CommitId, diag: &mut Diagnostics) -> Option<String> {
        match self.scm.commit_summary(commit).await {
            Ok(summary) => summary,
            Err(e) => {
                diag.warn(Warning::commit_unavailable(format!(
                    "Could not read summary for commit {}: {e}",
                    commit.short()
                )));
                None
            }
        }
    }

    /// The pointer's revision. A pointer that does not hold a revision is
    /// reported and treated as absent.
    async fn live_revision(&self, diag: &mut Diagnostics) -> Result<Option<Revision>, DeployError> {
        match self.ledger.current_revision().await {
            Ok(revision) => Ok(revision),
            Err(e @ LedgerError::InvalidPointer { .. }) => {
                diag.warn(Warning::invalid_pointer(e.to_string()));
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn copy_to_live(
        &self,
        revision: &Revision,
        key: &str,
    ) -> Result<(String, Decoding), DeployError> {
        let Some(relative) = self.layout.relative_to_revision(revision, key) else {
            return Err(DeployError::MissingObject(key.to_string()));
        };
        let fetched = self
            .bucket
            .get(key)
            .await?
            .ok_or_else(|| DeployError::MissingObject(key.to_string()))?;

        let live_key = self.layout.live_key(relative);
        self.bucket
            .put(&live_key, fetched.body, &PutOverrides::default())
            .await?;
        Ok((key.to_string(), fetched.decoding))
    }

    async fn fire(
        &self,
        point: HookPoint,
        context: &HookContext,
        diag: &mut Diagnostics,
    ) -> Result<(), DeployError> {
        let Some(result) = self.hooks.run(point, context).await else {
            return Ok(());
        };
        if result.success {
            return Ok(());
        }

        let detail = failure_detail(&result);
        if point.is_fatal() {
            return Err(DeployError::HookFailed { point, detail });
        }
        diag.warn(Warning::hook_failed(format!("{point} hook failed: {detail}")));
        Ok(())
    }
}

fn failure_detail(result: &HookResult) -> String {
    let stderr = result.stderr.trim();
    match (result.exit_code, stderr.is_empty()) {
        (Some(code), true) => format!("exit code {code}"),
        (Some(code), false) => format!("exit code {code}: {stderr}"),
        (None, true) => "terminated without exit code".to_string(),
        (None, false) => stderr.to_string(),
    }
}
