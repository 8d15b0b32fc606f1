//! Threshold table and size-bucket lookup.

use std::collections::BTreeMap;
use tracing::debug;

/// Applied labels are `size/<bucket>`.
pub const LABEL_PREFIX: &str = "size/";

/// Ascending (threshold, bucket) pairs built from a string-keyed table.
#[derive(Debug, Clone)]
pub struct SizeThresholds {
    thresholds: Vec<(i64, String)>,
}

impl SizeThresholds {
    /// Build the table, skipping keys that do not parse as integers.
    #[must_use]
    pub fn new(sizes: &BTreeMap<String, String>) -> Self {
        let mut thresholds: Vec<(i64, String)> = Vec::new();
        for (key, bucket) in sizes {
            match key.trim().parse::<i64>() {
                Ok(threshold) => thresholds.push((threshold, bucket.clone())),
                Err(_) => debug!(key = %key, "Skipping non-integer size threshold"),
            }
        }
        thresholds.sort();
        Self { thresholds }
    }

    /// Label for the largest threshold not exceeding `total`.
    ///
    /// Returns `None` when no threshold is satisfied, which can only happen
    /// with a caller-supplied table missing a `0` entry.
    #[must_use]
    pub fn label_for(&self, total: u64) -> Option<String> {
        let mut label = None;
        for (threshold, bucket) in &self.thresholds {
            if meets(total, *threshold) {
                label = Some(format!("{LABEL_PREFIX}{bucket}"));
            }
        }
        label
    }
}

#[allow(clippy::cast_sign_loss)]
fn meets(total: u64, threshold: i64) -> bool {
    threshold <= 0 || total >= threshold as u64
}
