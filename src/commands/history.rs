// ABOUTME: Read-only commands: current, list, and changes.
// ABOUTME: Report revision state without writing to the bucket.

use super::context::connect;
use s3_deployer::config::Config;
use s3_deployer::diagnostics::Diagnostics;
use s3_deployer::error::Result;
use s3_deployer::output::Output;
use std::path::Path;

pub async fn current(config: Config, project_dir: &Path, output: Output) -> Result<()> {
    let deployer = connect(&config, project_dir, &output)?;
    let current = deployer.current().await?;
    output.report(&[current.to_string()], &current);
    Ok(())
}

pub async fn list(config: Config, project_dir: &Path, output: Output) -> Result<()> {
    let deployer = connect(&config, project_dir, &output)?;
    let mut diag = Diagnostics::default();
    let entries = deployer.list(&mut diag).await?;

    let lines = if entries.is_empty() {
        vec!["No revisions staged".to_string()]
    } else {
        entries.iter().map(ToString::to_string).collect()
    };

    output.warnings(&diag);
    output.report(&lines, &entries);
    Ok(())
}

pub async fn changes(
    config: Config,
    project_dir: &Path,
    from: &str,
    to: &str,
    output: Output,
) -> Result<()> {
    let deployer = connect(&config, project_dir, &output)?;
    let summaries = deployer.changes(from, to).await?;

    let lines = if summaries.is_empty() {
        vec![format!("No recorded changes between {from} and {to}")]
    } else {
        summaries.clone()
    };
    output.report(&lines, &summaries);
    Ok(())
}
