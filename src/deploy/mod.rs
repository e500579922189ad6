// ABOUTME: Deployment orchestration over staged revisions.
// ABOUTME: Exports the Deployer, its reports, and its error type.

mod deployer;
mod error;
mod report;

pub use deployer::Deployer;
pub use error::{DeployError, DeployErrorKind};
pub use report::{CurrentRevision, DeployReport, RevisionEntry, StageReport, SwitchReport};
