//! Runtime configuration, resolved once at startup and passed down as data.
//!
//! Every option reads from the environment the GitHub Actions runner
//! provides, with a matching CLI flag for local runs.

use clap::Parser;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Command-line arguments, each backed by the corresponding env var.
#[derive(Debug, Parser)]
#[command(name = "size-label")]
#[command(about = "Applies size/* labels to pull requests based on total changed lines")]
#[command(version)]
pub struct Cli {
    /// GitHub token used for API calls
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the pull_request event document
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Threshold table as a JSON object, e.g. {"0":"XS","10":"S"}
    #[arg(long, env = "INPUT_SIZES")]
    pub sizes: Option<String>,

    /// Newline-delimited glob patterns excluded from the change total
    #[arg(long, env = "IGNORED")]
    pub ignored: Option<String>,

    /// Enable debug logging (also enabled when DEBUG_ACTION is set)
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required env: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid INPUT_SIZES JSON: {0}")]
    InvalidSizes(#[from] serde_json::Error),

    #[error("INPUT_SIZES must be a JSON object")]
    SizesNotObject,
}

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub event_path: PathBuf,
    pub api_url: String,
    pub sizes: BTreeMap<String, String>,
    pub ignored: String,
    pub debug: bool,
}

impl Config {
    /// Validate CLI/env input into a usable configuration.
    pub fn resolve(cli: Cli) -> Result<Self, ConfigError> {
        let token = cli
            .token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingEnv("GITHUB_TOKEN"))?;
        let event_path = cli
            .event_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingEnv("GITHUB_EVENT_PATH"))?;

        let api_url = cli
            .api_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let debug = cli.debug
            || std::env::var("DEBUG_ACTION").is_ok_and(|v| !v.is_empty());

        Ok(Self {
            token,
            event_path,
            api_url,
            sizes: parse_sizes(cli.sizes.as_deref())?,
            ignored: cli.ignored.unwrap_or_default(),
            debug,
        })
    }
}

/// The documented default threshold table.
#[must_use]
pub fn default_sizes() -> BTreeMap<String, String> {
    [
        ("0", "XS"),
        ("10", "S"),
        ("30", "M"),
        ("100", "L"),
        ("500", "XL"),
        ("1000", "XXL"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn parse_sizes(raw: Option<&str>) -> Result<BTreeMap<String, String>, ConfigError> {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Ok(default_sizes()),
    };

    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = value else {
        return Err(ConfigError::SizesNotObject);
    };

    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let bucket = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, bucket)
        })
        .collect())
}
