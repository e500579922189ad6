// ABOUTME: Command module aggregator for the s3-deployer CLI.
// ABOUTME: Re-exports stage, switch, deploy, and history command handlers.

mod context;
mod history;
mod stage;
mod switch;

pub use context::load_config;
pub use history::{changes, current, list};
pub use stage::{deploy, stage};
pub use switch::switch;
