//! Model of the `pull_request` event document the Actions runner writes.

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

/// Actions that should produce a size label. Everything else is ignored.
const RELEVANT_ACTIONS: [&str; 3] = ["opened", "synchronize", "reopened"];

#[derive(Debug, Error)]
pub enum EventError {
    #[error("GITHUB_EVENT_PATH does not exist")]
    Missing,

    #[error("Failed to read GITHUB_EVENT_PATH: {0}")]
    Io(#[source] std::io::Error),

    #[error("Invalid JSON in GITHUB_EVENT_PATH: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid pull_request context in GITHUB_EVENT_PATH")]
    InvalidPullRequest,
}

#[derive(Debug, Default, Deserialize)]
pub struct PullRequestEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub base: Option<Base>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Base {
    #[serde(default)]
    pub repo: Option<Repo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Repo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub login: Option<String>,
}

/// Identifies the pull request a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestEvent {
    /// Read and parse the event document.
    pub fn load(path: &Path) -> Result<Self, EventError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                EventError::Missing
            } else {
                EventError::Io(e)
            }
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Whether the triggering action affects the change total.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        self.action
            .as_deref()
            .is_some_and(|a| RELEVANT_ACTIONS.contains(&a))
    }

    /// Action name for the ignored-action notice; `null` when absent.
    #[must_use]
    pub fn action_name(&self) -> &str {
        match self.action.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => "null",
        }
    }

    /// Extract the owner/repo/number triple. Any missing or empty field is
    /// a configuration error.
    pub fn pull_request_ref(&self) -> Result<PullRequestRef, EventError> {
        let pr = self
            .pull_request
            .as_ref()
            .ok_or(EventError::InvalidPullRequest)?;
        let number = pr
            .number
            .filter(|n| *n > 0)
            .ok_or(EventError::InvalidPullRequest)?;
        let repo = pr
            .base
            .as_ref()
            .and_then(|b| b.repo.as_ref())
            .ok_or(EventError::InvalidPullRequest)?;
        let name = repo
            .name
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(EventError::InvalidPullRequest)?;
        let owner = repo
            .owner
            .as_ref()
            .and_then(|o| o.login.clone())
            .filter(|s| !s.is_empty())
            .ok_or(EventError::InvalidPullRequest)?;

        Ok(PullRequestRef {
            owner,
            repo: name,
            number,
        })
    }
}
