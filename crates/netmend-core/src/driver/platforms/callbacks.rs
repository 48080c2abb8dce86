//! Post-parse tree fixups shared by the platform tables

use crate::tree::node::ConfigNode;
use once_cell::sync::Lazy;
use regex::Regex;

static ACL_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ip access-list (standard|extended) \S+").unwrap());
static IPV6_ACL_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ipv6 access-list \S+").unwrap());
static LEADING_SEQUENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+) ").unwrap());

/// Insert sequence numbers on unnumbered named-ACL entries, continuing after
/// any numbers already present
pub(super) fn add_acl_sequence_numbers(root: &mut ConfigNode) {
    for section in root.children_mut() {
        if !ACL_HEAD.is_match(&section.text) {
            continue;
        }
        let mut sequence: u64 = 10;
        for entry in section.children_mut() {
            match LEADING_SEQUENCE
                .captures(&entry.text)
                .and_then(|caps| caps[1].parse::<u64>().ok())
            {
                Some(existing) => sequence = existing + 10,
                None => {
                    entry.text = format!("{sequence} {}", entry.text);
                    sequence += 10;
                }
            }
        }
        section.reindex();
    }
}

/// Strip sequence numbers from IPv6 ACL entries; the device renumbers them
/// on its own and they never survive a round trip
pub(super) fn strip_ipv6_acl_sequence_numbers(root: &mut ConfigNode) {
    for section in root.children_mut() {
        if !IPV6_ACL_HEAD.is_match(&section.text) {
            continue;
        }
        for entry in section.children_mut() {
            let prefix = LEADING_SEQUENCE
                .captures(&entry.text)
                .map(|caps| caps[0].len());
            if let Some(length) = prefix {
                entry.text = entry.text[length..].to_string();
            }
        }
        section.reindex();
    }
}

/// Remove the `next`/`end` terminator leaves that survive marker-structured
/// FortiOS parsing
pub(super) fn strip_block_terminators(root: &mut ConfigNode) {
    root.retain_children(|child| !is_terminator(child));
    for child in root.children_mut() {
        strip_block_terminators(child);
    }
}

fn is_terminator(node: &ConfigNode) -> bool {
    node.is_leaf() && (node.text == "next" || node.text == "end")
}
