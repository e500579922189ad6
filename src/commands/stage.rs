// ABOUTME: Stage and deploy command implementations.
// ABOUTME: Upload a revision, and optionally make it live in the same run.

use super::context::connect;
use s3_deployer::config::Config;
use s3_deployer::deploy::StageReport;
use s3_deployer::diagnostics::Diagnostics;
use s3_deployer::error::Result;
use s3_deployer::output::Output;
use s3_deployer::types::Revision;
use std::path::Path;

pub async fn stage(
    config: Config,
    project_dir: &Path,
    revision: Option<Revision>,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let deployer = connect(&config, project_dir, &output)?;
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Staging {} from {}",
        config.app_path,
        deployer.source_dir().display()
    ));
    let report = deployer.stage(revision, &mut diag).await?;

    output.warnings(&diag);
    output.report(&stage_lines(&report), &report);
    output.success(&format!("Staged revision {}", report.revision));
    Ok(())
}

pub async fn deploy(
    config: Config,
    project_dir: &Path,
    revision: Option<Revision>,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let deployer = connect(&config, project_dir, &output)?;
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying {} from {}",
        config.app_path,
        deployer.source_dir().display()
    ));
    let report = deployer.deploy(revision, &mut diag).await?;

    let mut lines = stage_lines(&report.stage);
    lines.push(format!("  ✓ Copied {} file(s) live", report.switch.copied));

    output.warnings(&diag);
    output.report(&lines, &report);
    output.success(&format!("Deployed revision {}", report.switch.revision));
    Ok(())
}

fn stage_lines(report: &StageReport) -> Vec<String> {
    let mut lines = vec![format!(
        "  ✓ Uploaded {} file(s), {} bytes",
        report.files, report.bytes
    )];
    if let Some(commit) = &report.commit {
        lines.push(format!("  ✓ Recorded commit {}", commit.short()));
    }
    lines
}
