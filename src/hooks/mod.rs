// ABOUTME: Lifecycle hooks around deploy, stage, and switch.
// ABOUTME: Runs executable scripts from .s3-deployer/hooks/ with revision context in the environment.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::Revision;

/// Hook execution points in the revision lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    BeforeDeploy,
    AfterDeploy,
    BeforeStage,
    AfterStage,
    BeforeSwitch,
    AfterSwitch,
}

impl HookPoint {
    /// Get the hook filename for this point.
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::BeforeDeploy => "before-deploy",
            HookPoint::AfterDeploy => "after-deploy",
            HookPoint::BeforeStage => "before-stage",
            HookPoint::AfterStage => "after-stage",
            HookPoint::BeforeSwitch => "before-switch",
            HookPoint::AfterSwitch => "after-switch",
        }
    }

    /// Whether failure at this hook point aborts the operation.
    /// `before-*` hooks gate the operation; `after-*` failures only warn.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HookPoint::BeforeDeploy | HookPoint::BeforeStage | HookPoint::BeforeSwitch
        )
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.filename())
    }
}

/// Context passed to hooks via environment variables.
///
/// For switch hooks `revision` is the target and `previous_revision` the
/// revision live before the switch.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub app_path: String,
    pub revision: Revision,
    pub previous_revision: Option<Revision>,
}

impl HookContext {
    pub fn new(app_path: &str, revision: &Revision) -> Self {
        Self {
            app_path: app_path.to_string(),
            revision: revision.clone(),
            previous_revision: None,
        }
    }

    pub fn with_previous(mut self, previous: Option<&Revision>) -> Self {
        self.previous_revision = previous.cloned();
        self
    }

    /// Convert context to environment variables.
    pub fn to_env(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("S3_DEPLOYER_APP_PATH".to_string(), self.app_path.clone());
        env.insert("S3_DEPLOYER_REVISION".to_string(), self.revision.to_string());
        if let Some(ref prev) = self.previous_revision {
            env.insert("S3_DEPLOYER_PREVIOUS_REVISION".to_string(), prev.to_string());
        }
        env
    }
}

/// Result of running a hook.
#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Something that reacts to lifecycle points.
#[async_trait]
pub trait LifecycleHooks: Send + Sync {
    /// Run the hook for `point`. Returns None if there is no hook for it.
    async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult>;
}

/// No hooks at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

#[async_trait]
impl LifecycleHooks for NoHooks {
    async fn run(&self, _point: HookPoint, _context: &HookContext) -> Option<HookResult> {
        None
    }
}

/// Discovers and runs hook scripts from a project directory.
#[derive(Debug, Clone)]
pub struct ScriptHooks {
    hooks_dir: PathBuf,
}

impl ScriptHooks {
    /// Create a hook runner looking for hooks in the given project directory.
    pub fn new(project_dir: &Path) -> Self {
        Self {
            hooks_dir: project_dir.join(".s3-deployer").join("hooks"),
        }
    }

    /// Check if a hook exists for the given point.
    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }
}

#[async_trait]
impl LifecycleHooks for ScriptHooks {
    async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!("Running {} hook: {}", point, hook_path.display());

        let output = Command::new(&hook_path)
            .envs(context.to_env())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) => {
                let result = HookResult {
                    success: output.status.success(),
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if result.success {
                    tracing::info!("{} hook completed successfully", point);
                } else {
                    tracing::warn!("{} hook failed with exit code {:?}", point, result.exit_code);
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!("Failed to execute {} hook: {}", point, e);
                Some(HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}
