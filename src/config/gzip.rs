// ABOUTME: Gzip compression settings for uploaded objects.
// ABOUTME: Accepts a boolean switch or a non-empty list of key patterns.

use nonempty::NonEmpty;
use serde::Deserialize;

/// Which object keys are gzip-compressed before upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "GzipEntry")]
pub enum GzipConfig {
    /// `true` compresses every key, `false` none.
    Enabled(bool),
    /// Compress only keys matching one of these regular expressions.
    Matching(NonEmpty<String>),
}

impl Default for GzipConfig {
    fn default() -> Self {
        GzipConfig::Enabled(false)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GzipEntry {
    Flag(bool),
    Patterns(Vec<String>),
}

impl TryFrom<GzipEntry> for GzipConfig {
    type Error = String;

    fn try_from(entry: GzipEntry) -> Result<Self, Self::Error> {
        match entry {
            GzipEntry::Flag(enabled) => Ok(GzipConfig::Enabled(enabled)),
            GzipEntry::Patterns(patterns) => NonEmpty::from_vec(patterns)
                .map(GzipConfig::Matching)
                .ok_or_else(|| "gzip pattern list cannot be empty".to_string()),
        }
    }
}
