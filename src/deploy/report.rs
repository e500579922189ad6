// ABOUTME: Results returned by deployer operations.
// ABOUTME: Serializable for JSON output and displayable for the console.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::types::{CommitId, Revision};

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub revision: Revision,
    pub files: usize,
    pub bytes: u64,
    /// Commit recorded in the ledger, if it could be determined.
    pub commit: Option<CommitId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwitchReport {
    /// Revision that was live before the switch.
    pub previous: Option<Revision>,
    pub revision: Revision,
    /// Objects copied into the live key space.
    pub copied: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub stage: StageReport,
    pub switch: SwitchReport,
}

/// The live revision, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentRevision {
    pub revision: Option<Revision>,
    pub timestamp: Option<NaiveDateTime>,
}

impl CurrentRevision {
    pub fn new(revision: Option<Revision>) -> Self {
        let timestamp = revision.as_ref().map(Revision::timestamp);
        Self {
            revision,
            timestamp,
        }
    }
}

impl fmt::Display for CurrentRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(revision) => write!(f, "{} - {}", revision, revision.display_date()),
            None => f.write_str("No revision recorded"),
        }
    }
}

/// One staged revision in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionEntry {
    pub revision: Revision,
    pub timestamp: NaiveDateTime,
    pub commit: Option<CommitId>,
    pub summary: Option<String>,
    pub current: bool,
}

impl fmt::Display for RevisionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.revision, self.revision.display_date())?;
        match (&self.summary, &self.commit) {
            (Some(summary), _) => write!(f, " - {summary}")?,
            (None, Some(commit)) => write!(f, " - {}", commit.short())?,
            (None, None) => {}
        }
        if self.current {
            f.write_str(" (current)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(s: &str) -> Revision {
        Revision::parse(s).unwrap()
    }

    #[test]
    fn current_revision_display() {
        let current = CurrentRevision::new(Some(rev("20240101120000")));
        assert_eq!(current.to_string(), "20240101120000 - 01/01/2024 12:00");
        assert_eq!(
            CurrentRevision::new(None).to_string(),
            "No revision recorded"
        );
    }

    #[test]
    fn entry_display_prefers_summary() {
        let mut entry = RevisionEntry {
            revision: rev("20240101120000"),
            timestamp: rev("20240101120000").timestamp(),
            commit: Some(CommitId::new("0123456789abcdef").unwrap()),
            summary: Some("0123456 Fix header".to_string()),
            current: true,
        };
        assert_eq!(
            entry.to_string(),
            "20240101120000 - 01/01/2024 12:00 - 0123456 Fix header (current)"
        );

        entry.summary = None;
        entry.current = false;
        assert_eq!(entry.to_string(), "20240101120000 - 01/01/2024 12:00 - 0123456");
    }
}
