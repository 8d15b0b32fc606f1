//! GitHub REST API client for the file listing and label write.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::event::PullRequestRef;

/// Files are listed with this page size; a short page ends pagination.
pub const PER_PAGE: usize = 100;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API request failed ({status}): {body}")]
    Api { status: u16, body: String },
}

/// One file touched by the pull request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangedFile {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub previous_filename: Option<String>,
    /// Lines added plus removed. `None` when upstream reports a
    /// non-integer value, so one bad record never fails the page parse.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub changes: Option<u64>,
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64())
}

/// The two upstream operations a run needs. Narrow on purpose so the
/// aggregation logic can be exercised against a fake.
#[async_trait]
pub trait PullRequestApi {
    /// Fetch one page of the changed-file listing (pages start at 1).
    async fn list_changed_files(&self, page: usize) -> Result<Vec<ChangedFile>, GitHubError>;

    /// Apply labels to the pull request.
    async fn add_labels(&self, labels: &[String]) -> Result<(), GitHubError>;
}

/// GitHub client bound to a single pull request.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    pr: PullRequestRef,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str, pr: PullRequestRef) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("size-label/0.1"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            pr,
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GitHubError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl PullRequestApi for GitHubClient {
    async fn list_changed_files(&self, page: usize) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files?per_page={PER_PAGE}&page={page}",
            self.api_url, self.pr.owner, self.pr.repo, self.pr.number
        );
        debug!(%url, "Fetching PR files");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn add_labels(&self, labels: &[String]) -> Result<(), GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/labels",
            self.api_url, self.pr.owner, self.pr.repo, self.pr.number
        );
        let body = serde_json::json!({ "labels": labels });

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changed_file_parses_rename_record() {
        let file: ChangedFile = serde_json::from_str(
            r#"{"filename": "src/new.ts", "previous_filename": "docs/old.md", "changes": 12}"#,
        )
        .unwrap();
        assert_eq!(file.filename.as_deref(), Some("src/new.ts"));
        assert_eq!(file.previous_filename.as_deref(), Some("docs/old.md"));
        assert_eq!(file.changes, Some(12));
    }

    #[test]
    fn non_integer_changes_becomes_none() {
        let file: ChangedFile =
            serde_json::from_str(r#"{"filename": "a.rs", "changes": "many"}"#).unwrap();
        assert_eq!(file.changes, None);

        let file: ChangedFile =
            serde_json::from_str(r#"{"filename": "a.rs", "changes": null}"#).unwrap();
        assert_eq!(file.changes, None);

        let file: ChangedFile =
            serde_json::from_str(r#"{"filename": "a.rs", "changes": -3}"#).unwrap();
        assert_eq!(file.changes, None);
    }

    #[test]
    fn missing_fields_default_to_none() {
        let file: ChangedFile = serde_json::from_str("{}").unwrap();
        assert_eq!(file.filename, None);
        assert_eq!(file.previous_filename, None);
        assert_eq!(file.changes, None);
    }
}
