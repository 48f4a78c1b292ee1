//! Basename glob exclusion

use drivesync_fs::basename;
use globset::{GlobBuilder, GlobMatcher};

use crate::{Error, Result};

/// Ordered set of exclusion globs.
///
/// Patterns only ever see an entry's basename, so `*.tmp` excludes
/// `/a/b/c.tmp` but not `/a/b.tmp/c`. Exclusion is per entry: an excluded
/// directory does not hide its children unless they match on their own.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<(String, GlobMatcher)>,
}

impl ExclusionFilter {
    /// Compile `patterns`, failing on the first invalid glob.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                GlobBuilder::new(pattern)
                    .literal_separator(true)
                    .backslash_escape(true)
                    .build()
                    .map(|glob| (pattern.to_string(), glob.compile_matcher()))
                    .map_err(|source| Error::Pattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// First pattern, in configured order, matching the basename of `path`.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        let name = basename(path);
        self.patterns.iter().find_map(|(pattern, matcher)| {
            tracing::trace!("attempting to match {:?} to pattern {:?}", path, pattern);
            matcher.is_match(name).then_some(pattern.as_str())
        })
    }

    /// Whether `path` is excluded.
    pub fn excluded(&self, path: &str) -> bool {
        match self.matching_pattern(path) {
            Some(pattern) => {
                tracing::trace!("excluding {:?}: matched {:?}", path, pattern);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
