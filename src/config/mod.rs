// ABOUTME: Configuration types and parsing for s3-deployer.yml.
// ABOUTME: Replaces ambient global settings with one explicit value passed to the deployer.

mod deserialize;
mod env_value;
mod gzip;
mod retry;

pub use env_value::{EnvValue, resolve_optional};
pub use gzip::GzipConfig;
pub use retry::RetryConfig;

use crate::error::{Error, Result};
use chrono_tz::Tz;
use deserialize::{
    deserialize_app_path, deserialize_app_path_option, deserialize_concurrency,
    deserialize_current_path,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "s3-deployer.yml";
pub const CONFIG_FILENAME_ALT: &str = "s3-deployer.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".s3-deployer/config.yml";

/// Number of concurrent uploads and copies unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible services.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub allow_http: bool,

    #[serde(default)]
    pub access_key_id: Option<EnvValue>,

    #[serde(default)]
    pub secret_access_key: Option<EnvValue>,

    #[serde(default)]
    pub session_token: Option<EnvValue>,

    #[serde(deserialize_with = "deserialize_app_path")]
    pub app_path: String,

    #[serde(
        default = "default_current_path",
        deserialize_with = "deserialize_current_path"
    )]
    pub current_path: String,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    #[serde(default = "default_time_zone")]
    pub time_zone: Tz,

    #[serde(default)]
    pub cache_control: Option<String>,

    #[serde(default)]
    pub gzip: GzipConfig,

    #[serde(
        default = "default_concurrency",
        deserialize_with = "deserialize_concurrency"
    )]
    pub concurrency: usize,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

/// Named overrides selected with `--destination`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default, deserialize_with = "deserialize_app_path_option")]
    pub app_path: Option<String>,

    #[serde(default)]
    pub cache_control: Option<String>,
}

/// Credentials after environment references have been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_current_path() -> String {
    "current".to_string()
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_time_zone() -> Tz {
    chrono_tz::UTC
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(Error::InvalidConfig("bucket cannot be empty".to_string()));
        }
        for (name, dest) in &self.destinations {
            if let Some(ref bucket) = dest.bucket
                && bucket.trim().is_empty()
            {
                return Err(Error::InvalidConfig(format!(
                    "destination '{name}': bucket cannot be empty"
                )));
            }
        }
        Ok(())
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref bucket) = dest.bucket {
            merged.bucket = bucket.clone();
        }

        if let Some(ref app_path) = dest.app_path {
            merged.app_path = app_path.clone();
        }

        if dest.cache_control.is_some() {
            merged.cache_control = dest.cache_control.clone();
        }

        Ok(merged)
    }

    /// Resolve credential references against the current environment.
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials {
            access_key_id: resolve_optional(self.access_key_id.as_ref())?,
            secret_access_key: resolve_optional(self.secret_access_key.as_ref())?,
            session_token: resolve_optional(self.session_token.as_ref())?,
        })
    }

    pub fn template() -> Self {
        Config {
            bucket: "my-bucket".to_string(),
            region: default_region(),
            endpoint: None,
            allow_http: false,
            access_key_id: Some(EnvValue::FromEnv {
                var: "AWS_ACCESS_KEY_ID".to_string(),
                default: None,
            }),
            secret_access_key: Some(EnvValue::FromEnv {
                var: "AWS_SECRET_ACCESS_KEY".to_string(),
                default: None,
            }),
            session_token: None,
            app_path: "my-app".to_string(),
            current_path: default_current_path(),
            dist_dir: default_dist_dir(),
            time_zone: default_time_zone(),
            cache_control: None,
            gzip: GzipConfig::default(),
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryConfig::default(),
            destinations: HashMap::new(),
        }
    }
}

pub fn init_config(
    dir: &Path,
    bucket: Option<&str>,
    app_path: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(b) = bucket {
        if b.trim().is_empty() {
            return Err(Error::InvalidConfig("bucket cannot be empty".to_string()));
        }
        config.bucket = b.trim().to_string();
    }

    if let Some(p) = app_path {
        config.app_path = deserialize::normalize_key_path(p)
            .map_err(|e| Error::InvalidConfig(format!("app_path: {e}")))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"bucket: {}
region: {}
app_path: {}
dist_dir: {}

access_key_id:
  env: AWS_ACCESS_KEY_ID
secret_access_key:
  env: AWS_SECRET_ACCESS_KEY

# Revisions are named after the deploy time in this zone
time_zone: {}

# Compress everything (true), nothing (false), or matching keys:
# gzip:
#   - "\\.(js|css|html|svg)$"
gzip: false

# cache_control: "public, max-age=300"
"#,
        config.bucket,
        config.region,
        config.app_path,
        config.dist_dir.display(),
        config.time_zone,
    )
}
