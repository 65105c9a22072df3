//! Path prefix matching.
//!
//! # Design Decisions
//! - Matching is segment-aware: `/api` matches `/api` and `/api/x`, never `/apis`
//! - Path matching is case-sensitive
//! - No regex; a match is a single `strip_prefix`

/// Matches and strips a mount prefix from request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing `/` is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, path: &str) -> bool {
        self.strip(path).is_some()
    }

    /// Remove the prefix, returning the remaining path (always starting with `/`).
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}
