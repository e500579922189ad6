// ABOUTME: Revision ledger: current pointer, staged revision list, and commit records.
// ABOUTME: All state lives in the bucket; nothing is cached between calls.

use std::sync::Arc;

use bytes::Bytes;

use super::error::LedgerError;
use super::record::ShaRecord;
use crate::layout::KeyLayout;
use crate::store::{Bucket, PutOverrides};
use crate::types::{CommitId, Revision};

/// Cache-control for the pointer so clients never see a stale value.
pub const POINTER_CACHE_CONTROL: &str = "no-cache";

#[derive(Debug, Clone)]
pub struct Ledger {
    bucket: Arc<Bucket>,
    layout: KeyLayout,
}

impl Ledger {
    pub fn new(bucket: Arc<Bucket>, layout: KeyLayout) -> Self {
        Self { bucket, layout }
    }

    /// The live revision, or `None` if no pointer has been written yet.
    pub async fn current_revision(&self) -> Result<Option<Revision>, LedgerError> {
        let key = self.layout.pointer_key();
        let Some(fetched) = self.bucket.get(&key).await? else {
            return Ok(None);
        };

        let value = String::from_utf8_lossy(&fetched.body).into_owned();
        Revision::parse(&value)
            .map(Some)
            .map_err(|_| LedgerError::InvalidPointer { key, value })
    }

    pub async fn set_current_revision(&self, revision: &Revision) -> Result<(), LedgerError> {
        tracing::info!("Setting current revision to {revision}");
        self.bucket
            .put(
                &self.layout.pointer_key(),
                Bytes::from(revision.to_string()),
                &PutOverrides::cache_control(POINTER_CACHE_CONTROL),
            )
            .await?;
        Ok(())
    }

    /// Staged revisions in ascending (chronological) order.
    ///
    /// Child prefixes that are not valid revision identifiers are ignored.
    pub async fn list_revisions(&self) -> Result<Vec<Revision>, LedgerError> {
        let names = self
            .bucket
            .list_prefixes(&self.layout.revisions_prefix())
            .await?;

        let mut revisions: Vec<Revision> = names
            .iter()
            .filter_map(|name| Revision::parse(name).ok())
            .collect();
        revisions.sort();
        revisions.dedup();
        Ok(revisions)
    }

    /// The whole ledger. A missing ledger object is an empty record.
    pub async fn record(&self) -> Result<ShaRecord, LedgerError> {
        let fetched = self.bucket.get(&self.layout.ledger_key()).await?;
        Ok(fetched
            .map(|f| ShaRecord::parse(&String::from_utf8_lossy(&f.body)))
            .unwrap_or_default())
    }

    pub async fn sha_of(&self, revision: &Revision) -> Result<Option<CommitId>, LedgerError> {
        Ok(self.record().await?.get(revision).cloned())
    }

    /// Read, merge, and rewrite the ledger with `commit` recorded for `revision`.
    ///
    /// There is no cross-process locking: two concurrent stages against the
    /// same app path can each read the old ledger, and the later write drops
    /// the other's entry.
    pub async fn record_sha(
        &self,
        revision: &Revision,
        commit: &CommitId,
    ) -> Result<(), LedgerError> {
        let mut record = self.record().await?;
        if let Some(previous) = record.insert(revision.clone(), commit.clone())
            && previous != *commit
        {
            tracing::warn!("Replacing commit {previous} recorded for {revision} with {commit}");
        }

        tracing::info!("Recording commit {commit} for revision {revision}");
        self.bucket
            .put(
                &self.layout.ledger_key(),
                Bytes::from(record.render()),
                &PutOverrides::default(),
            )
            .await?;
        Ok(())
    }

    /// Resolve a revision identifier or commit-id prefix to a revision.
    ///
    /// Valid revision identifiers are returned unchanged without reading the
    /// ledger. Anything else is matched against recorded commit ids.
    pub async fn normalize(&self, input: &str) -> Result<Option<Revision>, LedgerError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        if let Ok(revision) = Revision::parse(input) {
            return Ok(Some(revision));
        }

        let record = self.record().await?;
        let resolved = record.find_by_commit_prefix(input).cloned();
        match &resolved {
            Some(revision) => tracing::debug!("Resolved commit {input} to revision {revision}"),
            None => tracing::debug!("No revision recorded for commit {input}"),
        }
        Ok(resolved)
    }
}
