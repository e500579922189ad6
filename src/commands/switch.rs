// ABOUTME: Switch command implementation.
// ABOUTME: Makes a staged revision live; rollback is a switch to an older revision.

use super::context::connect;
use s3_deployer::config::Config;
use s3_deployer::diagnostics::Diagnostics;
use s3_deployer::error::Result;
use s3_deployer::output::Output;
use std::path::Path;

pub async fn switch(
    config: Config,
    project_dir: &Path,
    target: &str,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let deployer = connect(&config, project_dir, &output)?;
    let mut diag = Diagnostics::default();

    output.progress(&format!("Switching {} to {target}", config.app_path));
    let report = deployer.switch(Some(target), &mut diag).await?;

    let mut lines = Vec::new();
    if let Some(previous) = &report.previous {
        lines.push(format!("  → Previous revision {previous}"));
    }
    lines.push(format!("  ✓ Copied {} file(s) live", report.copied));

    output.warnings(&diag);
    output.report(&lines, &report);
    output.success(&format!("Switched to revision {}", report.revision));
    Ok(())
}
