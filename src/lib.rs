// ABOUTME: Library root for s3-deployer - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod layout;
pub mod ledger;
pub mod output;
pub mod scm;
pub mod store;
pub mod types;
pub mod upload;
