//! Line predicates and lineage matching
//!
//! A [`MatchRule`] is a predicate over a single line of configuration text.
//! A *lineage* is an ordered sequence of match rules evaluated against the
//! root-to-node text path of a tree node; the final rule is always anchored
//! at the node itself.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One string or a set of alternatives, matching the v2 YAML rule format
/// where every field accepts either a scalar or a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A single alternative
    One(String),
    /// Any of several alternatives
    Many(Vec<String>),
}

impl OneOrMany {
    /// Iterate over the alternatives
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(s) => std::slice::from_ref(s).iter().map(String::as_str),
            Self::Many(v) => v.as_slice().iter().map(String::as_str),
        }
    }

    fn any(&self, predicate: impl Fn(&str) -> bool) -> bool {
        self.iter().any(predicate)
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<&[&str]> for OneOrMany {
    fn from(value: &[&str]) -> Self {
        Self::Many(value.iter().map(ToString::to_string).collect())
    }
}

/// Predicate over a single line of text
///
/// Every populated field must be satisfied for the rule to match; within a
/// field, any alternative may match. A rule with no populated field is
/// invalid and rejected by [`MatchRule::compile`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchRule {
    /// Exact text match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<OneOrMany>,
    /// Prefix match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startswith: Option<OneOrMany>,
    /// Suffix match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endswith: Option<OneOrMany>,
    /// Substring match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<OneOrMany>,
    /// Regex search (uncompiled pattern; compiled by [`MatchRule::compile`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_search: Option<OneOrMany>,
    /// Compiled `re_search` alternatives
    #[serde(skip)]
    compiled: Vec<Regex>,
}

impl MatchRule {
    /// Rule matching exact text
    #[must_use]
    pub fn equals(text: &str) -> Self {
        Self {
            equals: Some(text.into()),
            ..Self::default()
        }
    }

    /// Rule matching any of several exact texts
    #[must_use]
    pub fn equals_any(texts: &[&str]) -> Self {
        Self {
            equals: Some(texts.into()),
            ..Self::default()
        }
    }

    /// Rule matching a prefix
    #[must_use]
    pub fn startswith(prefix: &str) -> Self {
        Self {
            startswith: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Rule matching any of several prefixes
    #[must_use]
    pub fn startswith_any(prefixes: &[&str]) -> Self {
        Self {
            startswith: Some(prefixes.into()),
            ..Self::default()
        }
    }

    /// Rule matching a suffix
    #[must_use]
    pub fn endswith(suffix: &str) -> Self {
        Self {
            endswith: Some(suffix.into()),
            ..Self::default()
        }
    }

    /// Rule matching a substring
    #[must_use]
    pub fn contains(needle: &str) -> Self {
        Self {
            contains: Some(needle.into()),
            ..Self::default()
        }
    }

    /// Rule matching a regex, compiled eagerly
    ///
    /// # Errors
    /// Returns [`Error::InvalidRule`] if the pattern does not compile.
    pub fn re_search(pattern: &str) -> Result<Self> {
        let mut rule = Self {
            re_search: Some(pattern.into()),
            ..Self::default()
        };
        rule.compile()?;
        Ok(rule)
    }

    /// Compile regex alternatives and validate that at least one field is
    /// populated
    ///
    /// # Errors
    /// Returns [`Error::InvalidRule`] for an empty rule or a malformed
    /// pattern.
    pub fn compile(&mut self) -> Result<()> {
        if self.equals.is_none()
            && self.startswith.is_none()
            && self.endswith.is_none()
            && self.contains.is_none()
            && self.re_search.is_none()
        {
            return Err(Error::InvalidRule(
                "match rule has no populated field".to_string(),
            ));
        }
        self.compiled.clear();
        if let Some(patterns) = &self.re_search {
            for pattern in patterns.iter() {
                let regex = Regex::new(pattern)
                    .map_err(|e| Error::InvalidRule(format!("bad pattern {pattern:?}: {e}")))?;
                self.compiled.push(regex);
            }
        }
        Ok(())
    }

    /// Evaluate the predicate against one line of text
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        if let Some(set) = &self.equals {
            if !set.any(|alt| alt == line) {
                return false;
            }
        }
        if let Some(set) = &self.startswith {
            if !set.any(|alt| line.starts_with(alt)) {
                return false;
            }
        }
        if let Some(set) = &self.endswith {
            if !set.any(|alt| line.ends_with(alt)) {
                return false;
            }
        }
        if let Some(set) = &self.contains {
            if !set.any(|alt| line.contains(alt)) {
                return false;
            }
        }
        if self.re_search.is_some() && !self.compiled.iter().any(|re| re.is_match(line)) {
            return false;
        }
        true
    }
}

/// How lineage rules map onto a node's ancestor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Rules match any strictly increasing subsequence of the ancestor
    /// chain, anchored at the node itself
    #[default]
    Floating,
    /// Rules match the last `rules.len()` entries of the chain one-to-one
    Strict,
}

/// Evaluate a lineage against a root-to-node text path
///
/// `path` is the ancestor texts from the outermost section down to the node
/// itself (the root's empty text excluded). The final rule must match the
/// node; preceding rules must match earlier entries per `mode`. An empty
/// rule sequence never matches.
#[must_use]
pub fn lineage_matches(rules: &[MatchRule], path: &[&str], mode: MatchMode) -> bool {
    let (last_rule, leading) = match rules.split_last() {
        Some(split) => split,
        None => return false,
    };
    if path.len() < rules.len() {
        return false;
    }
    let (node_text, ancestors) = match path.split_last() {
        Some(split) => split,
        None => return false,
    };
    if !last_rule.matches(node_text) {
        return false;
    }
    match mode {
        MatchMode::Strict => {
            let offset = ancestors.len() - leading.len();
            leading
                .iter()
                .zip(&ancestors[offset..])
                .all(|(rule, text)| rule.matches(text))
        }
        MatchMode::Floating => {
            // Greedy from the leaf end: each rule takes the deepest ancestor
            // still above the previously matched one.
            let mut bound = ancestors.len();
            for rule in leading.iter().rev() {
                match ancestors[..bound]
                    .iter()
                    .rposition(|text| rule.matches(text))
                {
                    Some(position) => bound = position,
                    None => return false,
                }
            }
            true
        }
    }
}

/// Evaluate any of several lineages against a path (floating mode)
#[must_use]
pub fn any_lineage_matches(lineages: &[Vec<MatchRule>], path: &[&str]) -> bool {
    lineages
        .iter()
        .any(|rules| lineage_matches(rules, path, MatchMode::Floating))
}
