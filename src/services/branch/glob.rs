//! Branch Pattern Matching
//!
//! Policy table keys are either literal branch names or globs where `*`
//! matches any run of characters, `/` included. Globs are compiled into their
//! literal segments and matched anchored at both ends; no regular expressions
//! are involved, so `.` or `+` in a branch name only ever match themselves.

use release_cascade_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// A compiled `*` glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    source: String,
    /// Literal text between wildcards; always `wildcards + 1` entries
    segments: Vec<String>,
}

impl GlobPattern {
    /// Compile a pattern. A pattern without `*` matches only itself.
    pub fn compile(pattern: &str) -> Self {
        Self {
            source: pattern.to_string(),
            segments: pattern.split('*').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Anchored match of the whole `candidate`.
    pub fn matches(&self, candidate: &str) -> bool {
        let (first, rest) = match self.segments.split_first() {
            Some(split) => split,
            None => return candidate.is_empty(),
        };
        let (last, middle) = match rest.split_last() {
            Some(split) => split,
            None => return candidate == first,
        };

        if candidate.len() < first.len() + last.len()
            || !candidate.starts_with(first.as_str())
            || !candidate.ends_with(last.as_str())
        {
            return false;
        }

        // Leftmost placement of each middle segment leaves the most room for
        // the segments after it.
        let mut window = &candidate[first.len()..candidate.len() - last.len()];
        for segment in middle {
            match window.find(segment.as_str()) {
                Some(at) => window = &window[at + segment.len()..],
                None => return false,
            }
        }
        true
    }
}

/// Key of a policy table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BranchPattern {
    Literal(String),
    Glob(GlobPattern),
}

impl BranchPattern {
    /// Parse a table key; anything containing `*` is a glob.
    pub fn parse(pattern: &str) -> CoreResult<Self> {
        if pattern.trim().is_empty() {
            return Err(CoreError::config("Branch pattern must not be empty"));
        }
        if pattern.contains('*') {
            Ok(BranchPattern::Glob(GlobPattern::compile(pattern)))
        } else {
            Ok(BranchPattern::Literal(pattern.to_string()))
        }
    }

    /// The key as written.
    pub fn as_str(&self) -> &str {
        match self {
            BranchPattern::Literal(name) => name,
            BranchPattern::Glob(glob) => glob.as_str(),
        }
    }

    pub fn is_glob(&self) -> bool {
        matches!(self, BranchPattern::Glob(_))
    }
}

impl TryFrom<String> for BranchPattern {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BranchPattern::parse(&value)
    }
}

impl From<BranchPattern> for String {
    fn from(pattern: BranchPattern) -> String {
        pattern.as_str().to_string()
    }
}

impl std::fmt::Display for BranchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
