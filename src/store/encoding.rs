// ABOUTME: Content-type lookup and gzip handling for stored objects.
// ABOUTME: Decides per key whether to compress, and compresses or inflates bodies.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use regex::Regex;
use snafu::ResultExt;

use super::error::{InvalidPatternSnafu, StoreError};
use crate::config::GzipConfig;

/// Content type used when the extension is unknown.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub const GZIP_ENCODING: &str = "gzip";

/// Best-effort content type from the key's file extension.
pub fn content_type_for(key: &str) -> &'static str {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

pub fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

pub fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 2);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[derive(Debug, Clone)]
enum Mode {
    Never,
    Always,
    Matching(Vec<Regex>),
}

/// Which keys get gzip-compressed on upload.
#[derive(Debug, Clone)]
pub struct CompressionPolicy {
    mode: Mode,
    exempt: Vec<String>,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self::never()
    }
}

impl CompressionPolicy {
    pub fn never() -> Self {
        Self {
            mode: Mode::Never,
            exempt: Vec::new(),
        }
    }

    pub fn always() -> Self {
        Self {
            mode: Mode::Always,
            exempt: Vec::new(),
        }
    }

    pub fn matching<I, S>(patterns: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let regexes = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).context(InvalidPatternSnafu { pattern })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            mode: Mode::Matching(regexes),
            exempt: Vec::new(),
        })
    }

    pub fn from_config(config: &GzipConfig) -> Result<Self, StoreError> {
        match config {
            GzipConfig::Enabled(true) => Ok(Self::always()),
            GzipConfig::Enabled(false) => Ok(Self::never()),
            GzipConfig::Matching(patterns) => Self::matching(patterns.iter()),
        }
    }

    /// Never compress `key`, whatever the mode.
    pub fn exempt(mut self, key: impl Into<String>) -> Self {
        self.exempt.push(key.into());
        self
    }

    pub fn should_compress(&self, key: &str) -> bool {
        if self.exempt.iter().any(|k| k == key) {
            return false;
        }
        match &self.mode {
            Mode::Never => false,
            Mode::Always => true,
            Mode::Matching(regexes) => regexes.iter().any(|r| r.is_match(key)),
        }
    }
}
