//! Pull-request size labeler.
//!
//! Computes the total changed lines across a pull request's files, maps the
//! total to a size bucket, and applies the matching `size/*` label through
//! the GitHub REST API. Designed to run inside a GitHub Actions job
//! triggered by `pull_request` events.

// The run orchestrator emits the tool's console contract via println!
#![allow(clippy::disallowed_macros)]

pub mod config;
pub mod event;
pub mod filter;
pub mod github;
pub mod labels;
pub mod run;

pub use config::{Cli, Config, ConfigError};
pub use event::{PullRequestEvent, PullRequestRef};
pub use filter::IgnoreRules;
pub use github::{ChangedFile, GitHubClient, GitHubError, PullRequestApi};
pub use labels::SizeThresholds;
pub use run::{label_pull_request, run, Outcome, RunError};
