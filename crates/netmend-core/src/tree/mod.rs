//! Configuration trees
//!
//! [`Config`] wraps the distinguished root node of a parsed configuration
//! together with its platform, and carries every high-level tree operation:
//! rendering, lookup, merge, future-state prediction, tag filtering, and
//! dump/load persistence.

pub mod node;

use crate::driver::{driver_for, ConfigStyle, Driver, Platform};
use crate::error::{Error, Result};
use crate::match_rule::MatchRule;
use crate::tags::{self, TagRule};
use node::{ConfigNode, Descendants};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// A platform-bound configuration tree
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    platform: Platform,
    root: ConfigNode,
}

impl Config {
    /// Empty tree for a platform
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            root: ConfigNode::default(),
        }
    }

    /// Parse configuration text with the platform's driver
    ///
    /// # Errors
    /// Returns [`Error::Parse`] for malformed flat statements or unbalanced
    /// braced input; indented input is always accepted.
    pub fn parse(platform: Platform, text: &str) -> Result<Self> {
        let mut config = Self::new(platform);
        crate::parser::parse_into(config.driver(), text, &mut config.root)?;
        Ok(config)
    }

    pub(crate) fn from_root(platform: Platform, root: ConfigNode) -> Self {
        Self { platform, root }
    }

    /// The platform this tree was parsed for
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The platform's driver
    #[must_use]
    pub fn driver(&self) -> &'static Driver {
        driver_for(self.platform)
    }

    /// Borrow the root node
    #[must_use]
    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut ConfigNode {
        &mut self.root
    }

    /// Whether the tree has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// First top-level child matching a rule
    #[must_use]
    pub fn get_child(&self, rule: &MatchRule) -> Option<&ConfigNode> {
        self.root.get_child(rule)
    }

    /// Depth-first pre-order traversal of every node
    pub fn all_children(&self) -> Descendants<'_> {
        self.root.all_children()
    }

    /// Top-level children matching a rule
    pub fn children_iter_by_match_rule<'a>(
        &'a self,
        rule: &'a MatchRule,
    ) -> impl Iterator<Item = &'a ConfigNode> {
        self.root.children_iter_by_match_rule(rule)
    }

    /// Render the tree as device-ready text
    ///
    /// Siblings are emitted by `(order_weight, insertion index)`. Indented
    /// platforms render one line per node; flat platforms render one
    /// `set`/`delete` statement per leaf.
    #[must_use]
    pub fn text(&self) -> String {
        let driver = self.driver();
        let mut out = String::new();
        match driver.style {
            ConfigStyle::Indented => render_indented(&self.root, 0, driver.indentation, &mut out),
            ConfigStyle::Flat => {
                let mut path = Vec::new();
                render_flat(&self.root, driver, &mut path, false, &mut out);
            }
        }
        out
    }

    /// Apply additive tag rules to every matching node
    pub fn apply_tag_rules(&mut self, rules: &[TagRule]) {
        tags::apply_tag_rules(&mut self.root, rules);
    }

    /// Render only the subtrees selected by include/exclude tag sets
    ///
    /// A node is kept when `include` is empty or intersects its tags (or an
    /// ancestor's), and its tags are disjoint from `exclude`; parents of
    /// kept descendants are kept for rendering.
    #[must_use]
    pub fn filtered_text(&self, include: &BTreeSet<String>, exclude: &BTreeSet<String>) -> String {
        let filtered = Self::from_root(self.platform, tags::filtered_root(&self.root, include, exclude));
        filtered.text()
    }

    /// Deep-copy another tree's top-level sections into this one
    ///
    /// # Errors
    /// Returns [`Error::DuplicateChild`] when a section with the same text
    /// already exists and the parent is not allowed duplicates; returns
    /// [`Error::PlatformMismatch`] across platforms.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.ensure_same_platform(other)?;
        let driver = self.driver();
        for child in other.root.children() {
            if self.root.has_child(&child.text) && !driver.allows_duplicate_child(&[child.text.as_str()]) {
                return Err(Error::DuplicateChild {
                    parent: String::new(),
                    text: child.text.clone(),
                });
            }
            self.root.push_child(child.clone());
        }
        Ok(())
    }

    /// Predict the post-merge running state after a partial overlay is
    /// applied
    ///
    /// Unlike [`Config::merge`], overlapping sections are allowed and the
    /// overlay wins: negations in the overlay remove their positive
    /// counterparts, idempotent commands supersede their older forms, and
    /// untouched running content is preserved.
    ///
    /// # Errors
    /// Returns [`Error::PlatformMismatch`] across platforms.
    pub fn future(&self, overlay: &Self) -> Result<Self> {
        self.ensure_same_platform(overlay)?;
        let mut out = ConfigNode::default();
        let mut path = Vec::new();
        future_children(self.driver(), &self.root, &overlay.root, &mut path, &mut out);
        Ok(Self::from_root(self.platform, out))
    }

    /// Flatten the tree into a serializable dump
    #[must_use]
    pub fn dump(&self) -> Vec<DumpNode> {
        let mut dump = Vec::new();
        dump_node(&self.root, 0, &mut dump);
        dump
    }

    /// Serialize the dump as JSON
    ///
    /// # Errors
    /// Returns [`Error::Json`] on serialization failure.
    pub fn dump_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.dump())?)
    }

    /// Rebuild a tree from a dump without re-running the parser
    ///
    /// # Errors
    /// Returns [`Error::Parse`] when a dump entry's depth jumps past its
    /// parent.
    pub fn from_dump(platform: Platform, nodes: &[DumpNode]) -> Result<Self> {
        let mut config = Self::new(platform);
        let mut path: Vec<usize> = Vec::new();
        for (position, entry) in nodes.iter().enumerate() {
            if entry.depth == 0 || entry.depth > path.len() + 1 {
                return Err(Error::Parse {
                    line: position + 1,
                    message: format!("dump depth {} has no parent", entry.depth),
                    text: entry.text.clone(),
                });
            }
            path.truncate(entry.depth - 1);
            let parent = node_at_path_mut(&mut config.root, &path);
            let index = parent.children().len();
            let mut node = ConfigNode::new(entry.text.clone());
            node.tags = entry.tags.clone();
            node.comments = entry.comments.clone();
            node.negated = entry.negated;
            parent.push_child(node);
            path.push(index);
        }
        Ok(config)
    }

    /// Rebuild a tree from a JSON dump
    ///
    /// # Errors
    /// Returns [`Error::Json`] for malformed JSON and [`Error::Parse`] for an
    /// inconsistent dump.
    pub fn from_dump_json(platform: Platform, json: &str) -> Result<Self> {
        let nodes: Vec<DumpNode> = serde_json::from_str(json)?;
        Self::from_dump(platform, &nodes)
    }

    pub(crate) fn ensure_same_platform(&self, other: &Self) -> Result<()> {
        if self.platform == other.platform {
            Ok(())
        } else {
            Err(Error::PlatformMismatch {
                left: self.platform.to_string(),
                right: other.platform.to_string(),
            })
        }
    }
}

/// One flattened tree node in a [`Config::dump`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpNode {
    /// 1-based depth below the root
    pub depth: usize,
    /// Node text
    pub text: String,
    /// Node tags
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Node comments
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub comments: BTreeSet<String>,
    /// Flat-style delete marker
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

fn dump_node(node: &ConfigNode, depth: usize, out: &mut Vec<DumpNode>) {
    if depth > 0 {
        out.push(DumpNode {
            depth,
            text: node.text.clone(),
            tags: node.tags.clone(),
            comments: node.comments.clone(),
            negated: node.negated,
        });
    }
    for child in node.children() {
        dump_node(child, depth + 1, out);
    }
}

fn node_at_path_mut<'a>(root: &'a mut ConfigNode, path: &[usize]) -> &'a mut ConfigNode {
    let mut cursor = root;
    for &index in path {
        cursor = cursor.child_at_mut(index);
    }
    cursor
}

fn render_indented(node: &ConfigNode, depth: usize, indentation: usize, out: &mut String) {
    for child in node.sorted_children() {
        for _ in 0..depth * indentation {
            out.push(' ');
        }
        out.push_str(&child.text);
        out.push('\n');
        render_indented(child, depth + 1, indentation, out);
    }
}

fn render_flat(
    node: &ConfigNode,
    driver: &Driver,
    path: &mut Vec<String>,
    in_negated: bool,
    out: &mut String,
) {
    for child in node.sorted_children() {
        path.push(child.text.clone());
        let negated = in_negated || child.negated;
        if child.is_leaf() {
            let prefix = if negated {
                &driver.negation_prefix
            } else {
                &driver.declaration_prefix
            };
            out.push_str(prefix);
            out.push_str(&path.join(" "));
            out.push('\n');
        } else {
            render_flat(child, driver, path, negated, out);
        }
        path.pop();
    }
}

fn future_children(
    driver: &Driver,
    running: &ConfigNode,
    overlay: &ConfigNode,
    path: &mut Vec<String>,
    out: &mut ConfigNode,
) {
    // Running children removed by the overlay, overlay children consumed
    // into a running counterpart instead of appended.
    let mut removed: HashSet<usize> = HashSet::new();
    let mut consumed: HashSet<usize> = HashSet::new();

    for (position, item) in overlay.children().iter().enumerate() {
        match driver.style {
            ConfigStyle::Flat => {
                if item.negated {
                    if let Some(target) = running.child_position(&item.text) {
                        removed.insert(target);
                    }
                    consumed.insert(position);
                }
            }
            ConfigStyle::Indented => {
                if let Some(stripped) = item.text.strip_prefix(&driver.negation_prefix) {
                    if let Some(target) = running.child_position(stripped) {
                        removed.insert(target);
                        consumed.insert(position);
                    }
                } else if let Some(target) =
                    running.child_position(&format!("{}{}", driver.negation_prefix, item.text))
                {
                    // The overlay re-asserts a command the running config
                    // holds in negated form.
                    removed.insert(target);
                }
            }
        }
        // An idempotent overlay command supersedes running siblings of the
        // same family.
        path.push(item.text.clone());
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        if let Some(rule) = driver.idempotent_rule_for(&refs) {
            for (target, candidate) in running.children().iter().enumerate() {
                if candidate.text == item.text
                    || !driver.idempotent_texts_match(&candidate.text, &item.text)
                {
                    continue;
                }
                let mut candidate_path = refs.clone();
                candidate_path.pop();
                candidate_path.push(candidate.text.as_str());
                if crate::match_rule::lineage_matches(
                    rule,
                    &candidate_path,
                    crate::match_rule::MatchMode::Floating,
                ) {
                    removed.insert(target);
                }
            }
        }
        path.pop();
    }

    for (position, current) in running.children().iter().enumerate() {
        if removed.contains(&position) {
            continue;
        }
        match overlay.child_position(&current.text) {
            Some(overlay_position) if !consumed.contains(&overlay_position) => {
                consumed.insert(overlay_position);
                let mut section = current.shallow_copy();
                path.push(current.text.clone());
                future_children(
                    driver,
                    current,
                    &overlay.children()[overlay_position],
                    path,
                    &mut section,
                );
                path.pop();
                // A flat branch emptied by deletions is gone; an indented
                // section header is real config even with no sub-commands.
                if driver.style == ConfigStyle::Indented
                    || !section.is_leaf()
                    || current.is_leaf()
                {
                    out.push_child(section);
                }
            }
            _ => {
                out.push_child(current.clone());
            }
        }
    }

    for (position, item) in overlay.children().iter().enumerate() {
        if !consumed.contains(&position) {
            out.push_child(item.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ios(text: &str) -> Config {
        Config::parse(Platform::CiscoIos, text).unwrap()
    }

    #[test]
    fn test_render_round_trip() {
        let text = "vlan 3\n  name prod\ninterface Vlan2\n  no shutdown\n";
        assert_eq!(ios(text).text(), text);
    }

    #[test]
    fn test_merge_rejects_duplicate_section() {
        let mut left = ios("vlan 3\n  name prod\n");
        let right = ios("vlan 3\n  name lab\n");
        assert!(matches!(
            left.merge(&right),
            Err(Error::DuplicateChild { .. })
        ));
    }

    #[test]
    fn test_merge_appends_disjoint_sections() {
        let mut left = ios("vlan 3\n  name prod\n");
        let right = ios("vlan 4\n  name lab\n");
        left.merge(&right).unwrap();
        assert_eq!(left.text(), "vlan 3\n  name prod\nvlan 4\n  name lab\n");
    }

    #[test]
    fn test_future_overlay_wins_and_preserves_rest() {
        let running = ios("hostname old\nvlan 3\n  name prod\n");
        let overlay = ios("hostname new\n");
        let future = running.future(&overlay).unwrap();
        // The idempotent hostname is superseded; untouched content is
        // preserved in running order with overlay additions appended.
        assert_eq!(future.text(), "vlan 3\n  name prod\nhostname new\n");
    }

    #[test]
    fn test_future_negation_removes_counterpart() {
        let running = ios("ntp server 10.0.0.1\nhostname r1\n");
        let overlay = ios("no ntp server 10.0.0.1\n");
        let future = running.future(&overlay).unwrap();
        assert_eq!(future.text(), "hostname r1\n");
    }

    #[test]
    fn test_dump_round_trip() {
        let config = ios("vlan 3\n  name prod\ninterface Vlan2\n  shutdown\n");
        let rebuilt = Config::from_dump(Platform::CiscoIos, &config.dump()).unwrap();
        assert_eq!(rebuilt.text(), config.text());
    }

    #[test]
    fn test_from_dump_rejects_depth_jump() {
        let nodes = vec![DumpNode {
            depth: 2,
            text: "orphan".to_string(),
            tags: BTreeSet::new(),
            comments: BTreeSet::new(),
            negated: false,
        }];
        assert!(matches!(
            Config::from_dump(Platform::CiscoIos, &nodes),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_platform_mismatch_detected() {
        let left = ios("hostname r1\n");
        let right = Config::parse(Platform::CiscoNxos, "hostname r1\n").unwrap();
        assert!(matches!(
            left.future(&right),
            Err(Error::PlatformMismatch { .. })
        ));
    }
}
