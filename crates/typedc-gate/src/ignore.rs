//! Ignore rules: allow-listed issues that must not fail the gate.
//!
//! A rule has the same shape as a flat issue record, so a previous run's
//! flat output can be used as an ignore file as-is. Paths may use wildcard
//! segments:
//!
//! - `*` matches exactly one segment
//! - `**` matches one or more segments
//! - a segment containing `*` elsewhere (`get*`) is a glob within that segment
//!
//! `category`, `oldValue` and `newValue` must match exactly when present;
//! absent fields match anything.

use std::path::Path;

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use typedc_diff::{Suppressor, PATH_SEPARATOR};
use typedc_types::{Issue, IssueCategory};

use crate::error::{GateError, GateResult};

/// One allow-listed issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgnoreRule {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<IssueCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl IgnoreRule {
    /// A rule matching every issue at `path`.
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            category: None,
            old_value: None,
            new_value: None,
        }
    }

    pub fn with_category(mut self, category: IssueCategory) -> Self {
        self.category = Some(category);
        self
    }
}

impl From<&Issue> for IgnoreRule {
    fn from(issue: &Issue) -> Self {
        Self {
            path: issue.path.clone(),
            category: Some(issue.category),
            old_value: issue.old_value.clone(),
            new_value: issue.new_value.clone(),
        }
    }
}

#[derive(Clone, Debug)]
enum Segment {
    /// `*`
    One,
    /// `**`
    OneOrMore,
    Glob(GlobMatcher),
    Exact(String),
}

impl Segment {
    fn parse(text: &str) -> GateResult<Self> {
        Ok(match text {
            "*" => Self::One,
            "**" => Self::OneOrMore,
            t if t.contains('*') => {
                let glob = Glob::new(t).map_err(|e| {
                    GateError::InvalidRules(format!("invalid path pattern segment {t:?}: {e}"))
                })?;
                Self::Glob(glob.compile_matcher())
            }
            t => Self::Exact(t.to_string()),
        })
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Self::One | Self::OneOrMore => true,
            Self::Glob(matcher) => matcher.is_match(segment),
            Self::Exact(expected) => expected == segment,
        }
    }
}

/// A compiled qualified-path pattern.
#[derive(Clone, Debug)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> GateResult<Self> {
        Ok(Self {
            segments: pattern
                .split(PATH_SEPARATOR)
                .map(Segment::parse)
                .collect::<GateResult<_>>()?,
        })
    }

    /// Returns `true` if the whole of `path` matches the pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let width = parts.len() + 1;

        // matched[i * width + j]: the first i segments of the pattern match
        // the first j segments of the path.
        let mut matched = vec![false; (self.segments.len() + 1) * width];
        matched[0] = true;

        for (i, segment) in self.segments.iter().enumerate() {
            let row = (i + 1) * width;
            let prev = i * width;
            for j in 1..width {
                matched[row + j] = match segment {
                    Segment::OneOrMore => matched[prev + j - 1] || matched[row + j - 1],
                    other => matched[prev + j - 1] && other.matches(parts[j - 1]),
                };
            }
        }

        matched[self.segments.len() * width + parts.len()]
    }
}

#[derive(Clone, Debug)]
struct CompiledRule {
    rule: IgnoreRule,
    pattern: PathPattern,
}

impl CompiledRule {
    fn matches(&self, issue: &Issue) -> bool {
        let field_ok = |want: &Option<String>, have: &Option<String>| match want {
            Some(w) => have.as_deref() == Some(w.as_str()),
            None => true,
        };

        self.rule.category.map_or(true, |c| c == issue.category)
            && field_ok(&self.rule.old_value, &issue.old_value)
            && field_ok(&self.rule.new_value, &issue.new_value)
            && self.pattern.matches(&issue.path)
    }
}

/// An ordered, read-only set of ignore rules.
#[derive(Clone, Debug, Default)]
pub struct IgnoreRuleSet {
    rules: Vec<CompiledRule>,
}

impl IgnoreRuleSet {
    /// Compile `rules`, failing on the first malformed path pattern.
    pub fn new(rules: impl IntoIterator<Item = IgnoreRule>) -> GateResult<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                Ok(CompiledRule {
                    pattern: PathPattern::parse(&rule.path)?,
                    rule,
                })
            })
            .collect::<GateResult<_>>()?;
        Ok(Self { rules })
    }

    /// Parse a JSON array of rule records.
    pub fn from_json_str(json: &str) -> GateResult<Self> {
        let rules: Vec<IgnoreRule> =
            serde_json::from_str(json).map_err(|e| GateError::InvalidRules(e.to_string()))?;
        Self::new(rules)
    }

    /// Read and parse a rule file.
    pub fn load(path: &Path) -> GateResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| GateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_json_str(&json)?;
        tracing::debug!(rules = set.len(), path = %path.display(), "loaded ignore rules");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &IgnoreRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    /// The first rule matching `issue`, if any.
    pub fn first_match(&self, issue: &Issue) -> Option<&IgnoreRule> {
        self.rules.iter().find(|c| c.matches(issue)).map(|c| &c.rule)
    }

    /// Rules that match none of `suppressed`.
    pub fn unused_rules(&self, suppressed: &[Issue]) -> Vec<&IgnoreRule> {
        self.rules
            .iter()
            .filter(|c| !suppressed.iter().any(|issue| c.matches(issue)))
            .map(|c| &c.rule)
            .collect()
    }
}

impl Suppressor for IgnoreRuleSet {
    fn is_suppressed(&self, issue: &Issue) -> bool {
        self.first_match(issue).is_some()
    }
}
