// ABOUTME: Builds a configured Deployer for a command.
// ABOUTME: Resolves destination overrides, credentials, and project-relative paths.

use std::path::Path;
use std::sync::Arc;

use s3_deployer::config::Config;
use s3_deployer::deploy::Deployer;
use s3_deployer::error::Result;
use s3_deployer::hooks::ScriptHooks;
use s3_deployer::output::Output;
use s3_deployer::scm::Git;
use s3_deployer::store::{Bucket, ObjectStoreBackend, S3Settings};

/// Load the project's config, applying a destination if one was named.
pub fn load_config(project_dir: &Path, destination: Option<&str>) -> Result<Config> {
    let config = Config::discover(project_dir)?;
    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}

/// Connect to the configured bucket and wire git and hook scripts from
/// `project_dir`.
pub fn connect(
    config: &Config,
    project_dir: &Path,
    output: &Output,
) -> Result<Deployer<Git, ScriptHooks>> {
    output.progress(&format!(
        "  → Connecting to s3://{}/{}",
        config.bucket, config.app_path
    ));

    let credentials = config.credentials()?;
    let backend = ObjectStoreBackend::s3(&S3Settings {
        bucket: &config.bucket,
        region: &config.region,
        endpoint: config.endpoint.as_deref(),
        allow_http: config.allow_http,
        credentials: &credentials,
    })?;
    let bucket = Bucket::for_config(Arc::new(backend), config)?;

    Ok(Deployer::new(
        config,
        bucket,
        Git::new(project_dir),
        ScriptHooks::new(project_dir),
    )
    .with_source_dir(project_dir.join(&config.dist_dir)))
}
