//! Ignore-rule parsing and path matching.
//!
//! Rules are newline-delimited glob patterns. A leading `!` marks an include
//! override; blank lines and `#` comments are skipped. Literal `**` folds to
//! `*` before compilation, so patterns use plain wildcard matching rather
//! than gitignore-style recursive-directory semantics.

use glob::Pattern;
use tracing::warn;

/// Sentinel the upstream API uses for the missing side of a create/delete pair.
const NULL_PATH: &str = "/dev/null";

#[derive(Debug, Clone)]
struct IgnoreRule {
    pattern: Pattern,
    include: bool,
}

/// Ordered list of compiled ignore rules.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Parse newline-delimited pattern text into an ordered rule list.
    ///
    /// Patterns that fail to compile are skipped with a warning rather than
    /// failing the run.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (include, raw) = match trimmed.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, trimmed),
            };
            match Pattern::new(&raw.replace("**", "*")) {
                Ok(pattern) => rules.push(IgnoreRule { pattern, include }),
                Err(e) => {
                    warn!(pattern = %trimmed, error = %e, "Skipping invalid ignore pattern");
                }
            }
        }
        Self { rules }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a path is excluded from the change total.
    ///
    /// Missing paths and the `/dev/null` sentinel are always ignored. An
    /// include rule short-circuits to `false` no matter where it sits in the
    /// rule order; an exclude match sets the ignored flag and scanning
    /// continues so later include rules still get a chance.
    #[must_use]
    pub fn is_ignored(&self, path: Option<&str>) -> bool {
        let path = match path {
            Some(p) if !p.is_empty() && p != NULL_PATH => p,
            _ => return true,
        };

        let mut ignored = false;
        for rule in &self.rules {
            if rule.include {
                if rule.pattern.matches(path) {
                    return false;
                }
            } else if !ignored && rule.pattern.matches(path) {
                ignored = true;
            }
        }
        ignored
    }
}
