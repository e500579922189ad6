// ABOUTME: The SHAS ledger text format: one "sha - revision" pair per line.
// ABOUTME: Parsing tolerates junk lines; rendering is sorted by revision.

use std::collections::BTreeMap;

use crate::types::{CommitId, Revision};

const SEPARATOR: &str = " - ";

/// Parsed ledger mapping each revision to the commit it was staged from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaRecord {
    entries: BTreeMap<Revision, CommitId>,
}

impl ShaRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((commit, revision)) => {
                    entries.insert(revision, commit);
                }
                None => tracing::warn!("Skipping malformed ledger line {}: {line}", number + 1),
            }
        }
        Self { entries }
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(revision, commit)| format!("{commit}{SEPARATOR}{revision}\n"))
            .collect()
    }

    /// Record `commit` for `revision`, replacing any earlier entry.
    pub fn insert(&mut self, revision: Revision, commit: CommitId) -> Option<CommitId> {
        self.entries.insert(revision, commit)
    }

    pub fn get(&self, revision: &Revision) -> Option<&CommitId> {
        self.entries.get(revision)
    }

    /// First revision (in ascending order) whose commit starts with `prefix`.
    pub fn find_by_commit_prefix(&self, prefix: &str) -> Option<&Revision> {
        self.entries
            .iter()
            .find(|(_, commit)| commit.matches_prefix(prefix))
            .map(|(revision, _)| revision)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Revision, &CommitId)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> Option<(CommitId, Revision)> {
    let (commit, revision) = line.split_once(SEPARATOR)?;
    let commit = CommitId::new(commit).ok()?;
    let revision = Revision::parse(revision).ok()?;
    Some((commit, revision))
}
