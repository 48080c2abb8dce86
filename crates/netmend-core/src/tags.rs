//! Tag rules and tag-filtered rendering
//!
//! Tag rules are additive and order-independent: every rule whose lineage
//! matches a node unions its tags into the node's tag set. The v2 YAML rule
//! format is accepted verbatim, with scalar-or-sequence values everywhere.

use crate::error::{Error, Result};
use crate::match_rule::{lineage_matches, MatchMode, MatchRule, OneOrMany};
use crate::tree::node::ConfigNode;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Adds tags to every node a lineage matches
#[derive(Debug, Clone)]
pub struct TagRule {
    /// Lineage selecting the tagged nodes
    pub lineage: Vec<MatchRule>,
    /// Tags unioned into matching nodes
    pub apply_tags: BTreeSet<String>,
}

impl TagRule {
    /// Build a tag rule, validating the lineage
    ///
    /// # Errors
    /// Returns [`Error::InvalidRule`] for an empty lineage or an empty tag
    /// set.
    pub fn new(lineage: Vec<MatchRule>, tags: impl IntoIterator<Item = String>) -> Result<Self> {
        let apply_tags: BTreeSet<String> = tags.into_iter().collect();
        if lineage.is_empty() {
            return Err(Error::InvalidRule("tag rule with empty lineage".to_string()));
        }
        if apply_tags.is_empty() {
            return Err(Error::InvalidRule("tag rule with no tags".to_string()));
        }
        Ok(Self { lineage, apply_tags })
    }
}

/// v2 YAML rule shape: `{lineage: [<match rule>...], add_tags: <scalar|seq>}`
#[derive(Debug, Deserialize)]
struct RawTagRule {
    lineage: Vec<MatchRule>,
    add_tags: OneOrMany,
}

/// Load tag rules from the v2 YAML compatibility format
///
/// ```yaml
/// - lineage:
///     - startswith: [ntp, 'no ntp']
///   add_tags: ntp
/// ```
///
/// # Errors
/// Returns [`Error::Yaml`] for malformed YAML and [`Error::InvalidRule`] for
/// an empty lineage or a pattern that does not compile.
pub fn parse_tag_rules(yaml: &str) -> Result<Vec<TagRule>> {
    let raw: Vec<RawTagRule> = serde_yaml::from_str(yaml)?;
    raw.into_iter()
        .map(|mut rule| {
            for matcher in &mut rule.lineage {
                matcher.compile()?;
            }
            TagRule::new(
                rule.lineage,
                rule.add_tags.iter().map(ToString::to_string),
            )
        })
        .collect()
}

/// Union rule tags into every matching node below `root`
pub(crate) fn apply_tag_rules(root: &mut ConfigNode, rules: &[TagRule]) {
    let mut path = Vec::new();
    apply_recursive(root, rules, &mut path);
}

fn apply_recursive(node: &mut ConfigNode, rules: &[TagRule], path: &mut Vec<String>) {
    for child in node.children_mut() {
        path.push(child.text.clone());
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        for rule in rules {
            if lineage_matches(&rule.lineage, &refs, MatchMode::Floating) {
                child.tags.extend(rule.apply_tags.iter().cloned());
            }
        }
        apply_recursive(child, rules, path);
        path.pop();
    }
}

/// Copy of `root` holding only the nodes kept by the include/exclude sets
pub(crate) fn filtered_root(
    root: &ConfigNode,
    include: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
) -> ConfigNode {
    let mut out = root.shallow_copy();
    for child in root.children() {
        if let Some(kept) = prune(child, include, exclude, include.is_empty()) {
            out.push_child(kept);
        }
    }
    out
}

fn prune(
    node: &ConfigNode,
    include: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
    inherited: bool,
) -> Option<ConfigNode> {
    if !node.tags.is_disjoint(exclude) {
        return None;
    }
    let included = inherited || !node.tags.is_disjoint(include);
    let mut copy = node.shallow_copy();
    for child in node.children() {
        if let Some(kept) = prune(child, include, exclude, included) {
            copy.push_child(kept);
        }
    }
    // A parent with any kept descendant is itself kept for rendering.
    if included || !copy.is_leaf() {
        Some(copy)
    } else {
        None
    }
}
