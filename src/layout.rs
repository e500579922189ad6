// ABOUTME: Object key layout under the configured app path.
// ABOUTME: Derives revision, live, pointer, and ledger keys in one place.

use crate::config::Config;
use crate::types::Revision;

const REVISIONS_DIR: &str = "revisions";
const POINTER_NAME: &str = "CURRENT_REVISION";
const LEDGER_NAME: &str = "SHAS";

/// Key layout:
///
/// ```text
/// <app_path>/revisions/<revision>/<file>   staged copies
/// <app_path>/<current_path>/<file>         live copies
/// <app_path>/CURRENT_REVISION              current pointer
/// <app_path>/SHAS                          revision ledger
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    app_path: String,
    current_path: String,
}

impl KeyLayout {
    /// Both paths are expected to be normalized (no surrounding slashes).
    pub fn new(app_path: impl Into<String>, current_path: impl Into<String>) -> Self {
        Self {
            app_path: app_path.into(),
            current_path: current_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.app_path.clone(), config.current_path.clone())
    }

    pub fn app_path(&self) -> &str {
        &self.app_path
    }

    pub fn revisions_prefix(&self) -> String {
        format!("{}/{}", self.app_path, REVISIONS_DIR)
    }

    pub fn revision_prefix(&self, revision: &Revision) -> String {
        format!("{}/{}", self.revisions_prefix(), revision)
    }

    pub fn revision_key(&self, revision: &Revision, relative: &str) -> String {
        format!("{}/{}", self.revision_prefix(revision), relative)
    }

    pub fn live_prefix(&self) -> String {
        format!("{}/{}", self.app_path, self.current_path)
    }

    pub fn live_key(&self, relative: &str) -> String {
        format!("{}/{}", self.live_prefix(), relative)
    }

    pub fn pointer_key(&self) -> String {
        format!("{}/{}", self.app_path, POINTER_NAME)
    }

    pub fn ledger_key(&self) -> String {
        format!("{}/{}", self.app_path, LEDGER_NAME)
    }

    /// Path of `key` relative to the revision's prefix, if it lies under it.
    pub fn relative_to_revision<'a>(&self, revision: &Revision, key: &'a str) -> Option<&'a str> {
        let prefix = self.revision_prefix(revision);
        key.strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
    }
}
