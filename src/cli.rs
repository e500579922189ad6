// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use s3_deployer::types::Revision;

#[derive(Parser)]
#[command(name = "s3-deployer")]
#[command(about = "Revisioned static asset deploys to S3")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only final results (for CI)
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Target destination (defined in config)
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new s3-deployer.yml configuration file
    Init {
        /// Bucket to deploy to
        #[arg(long)]
        bucket: Option<String>,

        /// Key prefix for this application
        #[arg(long)]
        app_path: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Upload the asset directory as a new revision without making it live
    Stage {
        /// Revision identifier (YYYYMMDDHHMMSS); defaults to now
        #[arg(short, long, env = "REVISION")]
        revision: Option<Revision>,
    },

    /// Make a staged revision live; also used to roll back
    Switch {
        /// Revision identifier or commit id prefix
        #[arg(short, long, env = "REVISION")]
        revision: Option<String>,
    },

    /// Stage and switch in one step
    Deploy {
        /// Revision identifier (YYYYMMDDHHMMSS); defaults to now
        #[arg(short, long, env = "REVISION")]
        revision: Option<Revision>,
    },

    /// Show the live revision
    Current,

    /// List staged revisions
    List,

    /// Show commits between two revisions
    Changes {
        /// Older revision or commit id prefix
        from: String,

        /// Newer revision or commit id prefix
        to: String,
    },
}
