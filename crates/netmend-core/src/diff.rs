//! Tree-aware unified diff
//!
//! Compares two trees sibling group by sibling group, tolerant of reordered
//! siblings and parent/child shape differences. Output lines carry a two
//! character marker: `- ` (only in the left tree), `+ ` (only in the right
//! tree), or `  ` (present in both, with differences somewhere below).
//! Duplicate sibling texts are paired by insertion order; unpaired excess on
//! either side diffs as removed or added.

use crate::tree::node::ConfigNode;
use crate::tree::Config;
use std::collections::HashMap;

/// Diff two trees into unified-diff-style lines
#[must_use]
pub fn unified_diff(left: &Config, right: &Config) -> Vec<String> {
    let mut lines = Vec::new();
    diff_children(left.root(), right.root(), 0, &mut lines);
    lines
}

fn occurrence_counts(node: &ConfigNode) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for child in node.children() {
        *counts.entry(child.text.as_str()).or_insert(0) += 1;
    }
    counts
}

fn nth_occurrence<'a>(node: &'a ConfigNode, text: &str, occurrence: usize) -> Option<&'a ConfigNode> {
    node.children()
        .iter()
        .filter(|child| child.text == text)
        .nth(occurrence)
}

fn diff_children(left: &ConfigNode, right: &ConfigNode, depth: usize, out: &mut Vec<String>) {
    let right_counts = occurrence_counts(right);
    let left_counts = occurrence_counts(left);

    // Left order first: common entries and removals.
    let mut seen_left: HashMap<&str, usize> = HashMap::new();
    for child in left.children() {
        let occurrence = {
            let counter = seen_left.entry(child.text.as_str()).or_insert(0);
            let current = *counter;
            *counter += 1;
            current
        };
        if occurrence < right_counts.get(child.text.as_str()).copied().unwrap_or(0) {
            if let Some(counterpart) = nth_occurrence(right, &child.text, occurrence) {
                let mut nested = Vec::new();
                diff_children(child, counterpart, depth + 1, &mut nested);
                if !nested.is_empty() {
                    out.push(format!("{}  {}", "  ".repeat(depth), child.text));
                    out.append(&mut nested);
                }
            }
        } else {
            emit_subtree(child, depth, '-', out);
        }
    }

    // Right order for additions.
    let mut seen_right: HashMap<&str, usize> = HashMap::new();
    for child in right.children() {
        let occurrence = {
            let counter = seen_right.entry(child.text.as_str()).or_insert(0);
            let current = *counter;
            *counter += 1;
            current
        };
        if occurrence >= left_counts.get(child.text.as_str()).copied().unwrap_or(0) {
            emit_subtree(child, depth, '+', out);
        }
    }
}

fn emit_subtree(node: &ConfigNode, depth: usize, sign: char, out: &mut Vec<String>) {
    out.push(format!("{}{sign} {}", "  ".repeat(depth), node.text));
    for child in node.children() {
        emit_subtree(child, depth + 1, sign, out);
    }
}
