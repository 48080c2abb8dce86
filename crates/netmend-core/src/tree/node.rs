//! Configuration tree node
//!
//! Nodes own their children uniquely; there are no parent references.
//! Operations that need a node's lineage carry the root-to-node text path
//! explicitly during traversal.

use crate::error::{Error, Result};
use crate::match_rule::MatchRule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Default sibling ordering weight
pub const DEFAULT_WEIGHT: u32 = 500;

/// Records which device contributed a node to a merged multi-device tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInstance {
    /// Positive device identifier, assigned by the reporter
    pub id: u32,
    /// Tags carried by the contributing node
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Comments carried by the contributing node
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub comments: BTreeSet<String>,
}

/// A node in a hierarchical configuration tree
#[derive(Debug, Clone, Default)]
pub struct ConfigNode {
    /// Canonical command text, after per-line substitutions
    pub text: String,
    /// Ordered child nodes, insertion order preserved
    children: Vec<ConfigNode>,
    /// Secondary index: child text to position of its first occurrence
    child_index: HashMap<String, usize>,
    /// Free-form tags, set by tag rules
    pub tags: BTreeSet<String>,
    /// Free-form annotations
    pub comments: BTreeSet<String>,
    /// Sibling ordering weight; lower renders earlier
    pub order_weight: u32,
    /// True for nodes created as remediation output
    pub is_new_in_config: bool,
    /// Flat-style `delete` marker; always false on indented platforms
    pub negated: bool,
    /// Contributing devices, populated only by the multi-device reporter
    pub instances: Vec<NodeInstance>,
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.tags == other.tags
            && self.comments == other.comments
            && self.order_weight == other.order_weight
            && self.is_new_in_config == other.is_new_in_config
            && self.negated == other.negated
            && self.children == other.children
    }
}

impl ConfigNode {
    /// Create a childless node with default metadata
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            order_weight: DEFAULT_WEIGHT,
            ..Self::default()
        }
    }

    /// Borrow the ordered children
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Mutably iterate over the direct children
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Self> {
        self.children.iter_mut()
    }

    /// Whether this node has no children
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether a direct child with this exact text exists
    #[must_use]
    pub fn has_child(&self, text: &str) -> bool {
        self.child_index.contains_key(text)
    }

    /// Look up a direct child by exact text (first occurrence when the
    /// parent carries duplicates)
    #[must_use]
    pub fn child_by_text(&self, text: &str) -> Option<&Self> {
        self.child_index.get(text).map(|&i| &self.children[i])
    }

    /// Mutable variant of [`ConfigNode::child_by_text`]
    pub fn child_by_text_mut(&mut self, text: &str) -> Option<&mut Self> {
        match self.child_index.get(text) {
            Some(&i) => Some(&mut self.children[i]),
            None => None,
        }
    }

    /// First direct child matching a rule
    #[must_use]
    pub fn get_child(&self, rule: &MatchRule) -> Option<&Self> {
        self.children.iter().find(|child| rule.matches(&child.text))
    }

    /// Direct children matching a rule
    pub fn children_iter_by_match_rule<'a>(
        &'a self,
        rule: &'a MatchRule,
    ) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(|child| rule.matches(&child.text))
    }

    /// Append a child unconditionally, keeping the text index pointed at the
    /// first occurrence
    pub fn push_child(&mut self, node: Self) -> &mut Self {
        let position = self.children.len();
        self.child_index
            .entry(node.text.clone())
            .or_insert(position);
        self.children.push(node);
        &mut self.children[position]
    }

    /// Append a child, rejecting a duplicate text unless allowed
    ///
    /// # Errors
    /// Returns [`Error::DuplicateChild`] when a sibling with the same text
    /// already exists and `allow_duplicate` is false.
    pub fn add_child(&mut self, node: Self, allow_duplicate: bool) -> Result<&mut Self> {
        if !allow_duplicate && self.has_child(&node.text) {
            return Err(Error::DuplicateChild {
                parent: self.text.clone(),
                text: node.text,
            });
        }
        Ok(self.push_child(node))
    }

    /// Fetch the child with this text, creating it if absent
    pub fn get_or_add_child(&mut self, text: &str) -> &mut Self {
        let position = match self.child_index.get(text) {
            Some(&i) => i,
            None => {
                let i = self.children.len();
                self.child_index.insert(text.to_string(), i);
                self.children.push(Self::new(text));
                i
            }
        };
        &mut self.children[position]
    }

    /// Remove all direct children satisfying a predicate, rebuilding the
    /// text index
    pub fn retain_children(&mut self, predicate: impl FnMut(&Self) -> bool) {
        self.children.retain(predicate);
        self.reindex();
    }

    /// Childless copy preserving text and metadata
    #[must_use]
    pub fn shallow_copy(&self) -> Self {
        Self {
            text: self.text.clone(),
            children: Vec::new(),
            child_index: HashMap::new(),
            tags: self.tags.clone(),
            comments: self.comments.clone(),
            order_weight: self.order_weight,
            is_new_in_config: self.is_new_in_config,
            negated: self.negated,
            instances: Vec::new(),
        }
    }

    /// Recursive copy with every node flagged as new remediation output
    #[must_use]
    pub fn deep_copy_marked_new(&self) -> Self {
        let mut copy = self.shallow_copy();
        copy.is_new_in_config = true;
        for child in &self.children {
            copy.push_child(child.deep_copy_marked_new());
        }
        copy
    }

    /// Depth-first pre-order traversal of all descendants, insertion order
    pub fn all_children(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Direct children ordered by `(order_weight, insertion index)`
    #[must_use]
    pub fn sorted_children(&self) -> Vec<&Self> {
        let mut ordered: Vec<&Self> = self.children.iter().collect();
        ordered.sort_by_key(|child| child.order_weight);
        ordered
    }

    /// Whether two subtrees carry the same texts in the same shape
    #[must_use]
    pub fn subtree_text_eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.negated == other.negated
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.subtree_text_eq(b))
    }

    /// Position of the first child with this text
    pub(crate) fn child_position(&self, text: &str) -> Option<usize> {
        self.child_index.get(text).copied()
    }

    /// Mutable access to the child at a known position
    pub(crate) fn child_at_mut(&mut self, position: usize) -> &mut Self {
        &mut self.children[position]
    }

    /// Consume the node, yielding its children
    pub(crate) fn into_children(self) -> Vec<Self> {
        self.children
    }

    /// Rebuild the text index from the children vector
    pub(crate) fn reindex(&mut self) {
        self.child_index.clear();
        for (position, child) in self.children.iter().enumerate() {
            self.child_index
                .entry(child.text.clone())
                .or_insert(position);
        }
    }
}

/// Iterator over a node's descendants, depth-first pre-order
pub struct Descendants<'a> {
    stack: Vec<&'a ConfigNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ConfigNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
