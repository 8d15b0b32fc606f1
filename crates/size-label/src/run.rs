//! One labeling pass end to end: event gating, file aggregation, label write.

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::event::{EventError, PullRequestEvent};
use crate::filter::IgnoreRules;
use crate::github::{GitHubClient, GitHubError, PullRequestApi, PER_PAGE};
use crate::labels::SizeThresholds;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Only reachable with a caller-supplied threshold table that has no
    /// satisfiable entry. Signals misconfiguration, not a transient issue.
    #[error("No size label computed")]
    NoLabel,
}

/// What a single invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The triggering action does not affect the change total.
    Ignored { action: String },
    /// A label was computed and applied.
    Labeled { changed_lines: u64, label: String },
}

/// Run one labeling pass with the given configuration.
pub async fn run(config: &Config) -> Result<Outcome, RunError> {
    let event = PullRequestEvent::load(&config.event_path)?;
    if !event.is_relevant() {
        let action = event.action_name().to_string();
        println!("Action will be ignored: {action}");
        return Ok(Outcome::Ignored { action });
    }

    let pr = event.pull_request_ref()?;
    debug!(owner = %pr.owner, repo = %pr.repo, number = pr.number, "Labeling pull request");

    let rules = IgnoreRules::parse(&config.ignored);
    if !rules.is_empty() {
        debug!(patterns = %config.ignored, "Ignored patterns");
    }
    let thresholds = SizeThresholds::new(&config.sizes);

    let api = GitHubClient::new(&config.api_url, &config.token, pr)?;
    label_pull_request(&api, &rules, &thresholds).await
}

/// Aggregate qualifying changed lines and apply the matching size label.
pub async fn label_pull_request<A: PullRequestApi>(
    api: &A,
    rules: &IgnoreRules,
    thresholds: &SizeThresholds,
) -> Result<Outcome, RunError> {
    let changed_lines = count_changed_lines(api, rules).await?;
    println!("Changed lines: {changed_lines}");

    let label = thresholds.label_for(changed_lines);
    println!("Matching label: {}", label.as_deref().unwrap_or(""));
    let label = label.ok_or(RunError::NoLabel)?;

    api.add_labels(std::slice::from_ref(&label)).await?;
    println!("Added label: {label}");

    Ok(Outcome::Labeled {
        changed_lines,
        label,
    })
}

/// Page through the changed-file listing, summing `changes` for records
/// that are not excluded. A record is excluded only when both its previous
/// and current paths are ignored, so a rename counts unless neither
/// endpoint matters.
async fn count_changed_lines<A: PullRequestApi>(
    api: &A,
    rules: &IgnoreRules,
) -> Result<u64, RunError> {
    let mut total = 0u64;
    let mut page = 1;

    loop {
        let files = api.list_changed_files(page).await?;
        if files.is_empty() {
            break;
        }

        for file in &files {
            if rules.is_ignored(file.previous_filename.as_deref())
                && rules.is_ignored(file.filename.as_deref())
            {
                continue;
            }

            match file.changes {
                Some(changes) => total += changes,
                None => {
                    debug!(file = ?file.filename, "Skipping file with non-integer change count");
                }
            }
        }

        if files.len() < PER_PAGE {
            break;
        }
        page += 1;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sizes;
    use crate::github::ChangedFile;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeApi {
        pages: Vec<Vec<ChangedFile>>,
        list_calls: Mutex<Vec<usize>>,
        labeled: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn new(pages: Vec<Vec<ChangedFile>>) -> Self {
            Self {
                pages,
                list_calls: Mutex::new(Vec::new()),
                labeled: Mutex::new(Vec::new()),
            }
        }

        fn with_files(files: Vec<ChangedFile>) -> Self {
            Self::new(vec![files])
        }
    }

    #[async_trait]
    impl PullRequestApi for FakeApi {
        async fn list_changed_files(&self, page: usize) -> Result<Vec<ChangedFile>, GitHubError> {
            self.list_calls.lock().unwrap().push(page);
            Ok(self.pages.get(page - 1).cloned().unwrap_or_default())
        }

        async fn add_labels(&self, labels: &[String]) -> Result<(), GitHubError> {
            self.labeled.lock().unwrap().extend_from_slice(labels);
            Ok(())
        }
    }

    fn file(name: &str, changes: u64) -> ChangedFile {
        ChangedFile {
            filename: Some(name.to_string()),
            changes: Some(changes),
            ..ChangedFile::default()
        }
    }

    fn thresholds() -> SizeThresholds {
        SizeThresholds::new(&default_sizes())
    }

    #[tokio::test]
    async fn sums_changes_and_applies_label() {
        let api = FakeApi::with_files(vec![
            file("src/a.rs", 5),
            file("src/b.rs", 12),
            file("README.md", 4),
        ]);

        let outcome = label_pull_request(&api, &IgnoreRules::default(), &thresholds())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 21,
                label: "size/S".to_string(),
            }
        );
        assert_eq!(*api.labeled.lock().unwrap(), vec!["size/S".to_string()]);
    }

    #[tokio::test]
    async fn ignored_files_do_not_count() {
        let api = FakeApi::with_files(vec![file("docs/guide.md", 400), file("src/a.rs", 5)]);
        let rules = IgnoreRules::parse("docs/*");

        let outcome = label_pull_request(&api, &rules, &thresholds()).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 5,
                label: "size/XS".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn rename_counts_unless_both_endpoints_are_ignored() {
        let renamed = ChangedFile {
            filename: Some("src/new.ts".to_string()),
            previous_filename: Some("docs/old.md".to_string()),
            changes: Some(50),
        };
        let api = FakeApi::with_files(vec![renamed]);
        let rules = IgnoreRules::parse("docs/*");

        let outcome = label_pull_request(&api, &rules, &thresholds()).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 50,
                label: "size/M".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn rename_within_ignored_area_does_not_count() {
        let renamed = ChangedFile {
            filename: Some("docs/new.md".to_string()),
            previous_filename: Some("docs/old.md".to_string()),
            changes: Some(50),
        };
        let api = FakeApi::with_files(vec![renamed, file("src/a.rs", 2)]);
        let rules = IgnoreRules::parse("docs/*");

        let outcome = label_pull_request(&api, &rules, &thresholds()).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 2,
                label: "size/XS".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn non_integer_changes_are_skipped() {
        let bad = ChangedFile {
            filename: Some("src/odd.rs".to_string()),
            ..ChangedFile::default()
        };
        let api = FakeApi::with_files(vec![bad, file("src/a.rs", 11)]);

        let outcome = label_pull_request(&api, &IgnoreRules::default(), &thresholds())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 11,
                label: "size/S".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn short_page_ends_pagination() {
        let pages = vec![
            (0..100).map(|i| file(&format!("a/{i}.rs"), 1)).collect(),
            (0..100).map(|i| file(&format!("b/{i}.rs"), 1)).collect(),
            (0..50).map(|i| file(&format!("c/{i}.rs"), 1)).collect(),
        ];
        let api = FakeApi::new(pages);

        let outcome = label_pull_request(&api, &IgnoreRules::default(), &thresholds())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 250,
                label: "size/L".to_string(),
            }
        );
        assert_eq!(*api.list_calls.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_first_page_yields_zero_total() {
        let api = FakeApi::new(vec![]);

        let outcome = label_pull_request(&api, &IgnoreRules::default(), &thresholds())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Labeled {
                changed_lines: 0,
                label: "size/XS".to_string(),
            }
        );
        assert_eq!(*api.list_calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn unsatisfiable_table_is_fatal() {
        let api = FakeApi::with_files(vec![file("src/a.rs", 3)]);
        let table = [("50".to_string(), "L".to_string())].into_iter().collect();
        let thresholds = SizeThresholds::new(&table);

        let err = label_pull_request(&api, &IgnoreRules::default(), &thresholds)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::NoLabel));
        assert!(api.labeled.lock().unwrap().is_empty());
    }
}
