//! Glob-style path patterns

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;

/// A `/`-separated glob relative to an input root
///
/// `*` matches any run of characters inside one segment and `?` exactly one.
/// Every other character is literal.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    literal_prefix: String,
    matcher: Regex,
}

impl PathPattern {
    /// Compile a pattern such as `log_data/*/*/*.json`
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::config("Path pattern must not be empty"));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::config(format!(
                "Path pattern '{pattern}' contains an empty segment"
            )));
        }

        // Leading wildcard-free directories are listed directly
        let literal_prefix = segments[..segments.len() - 1]
            .iter()
            .take_while(|s| !is_wildcard(s))
            .copied()
            .collect::<Vec<_>>()
            .join("/");

        let body = segments
            .iter()
            .map(|s| segment_regex(s))
            .collect::<Vec<_>>()
            .join("/");
        let matcher = Regex::new(&format!("^{body}$"))
            .map_err(|e| Error::config(format!("Invalid path pattern '{pattern}': {e}")))?;

        Ok(Self {
            raw: trimmed.to_string(),
            literal_prefix,
            matcher,
        })
    }

    /// Directory prefix with no wildcards, where listing starts
    pub fn literal_prefix(&self) -> &str {
        &self.literal_prefix
    }

    /// Pattern text as given (without surrounding slashes)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether a relative path matches the whole pattern
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

fn segment_regex(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 8);
    let mut literal = String::new();
    for c in segment.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { "[^/]*" } else { "[^/]" });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}
