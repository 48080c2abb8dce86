//! Cisco-style indentation parser
//!
//! Builds the tree from relative indentation: a line deeper than the
//! previous open section attaches beneath it, and a dedent pops back to the
//! nearest shallower ancestor. Substitution and indent-adjust rules from the
//! driver run before any structure is read.

use crate::driver::Driver;
use crate::error::Result;
use crate::tree::node::ConfigNode;
use tracing::warn;

pub(super) fn parse(driver: &Driver, text: &str, root: &mut ConfigNode) -> Result<()> {
    let mut processed = text.to_string();
    for rule in &driver.full_text_sub {
        processed = rule
            .search
            .replace_all(&processed, rule.replace.as_str())
            .into_owned();
    }

    // Open indent-adjust regions, as indices into the driver's rule table.
    let mut adjust_stack: Vec<usize> = Vec::new();
    // Parallel stacks describing the currently open sections: virtual
    // indent, child index from the root, and node text.
    let mut indents: Vec<i64> = Vec::new();
    let mut path: Vec<usize> = Vec::new();
    let mut path_texts: Vec<String> = Vec::new();

    for (line_number, raw) in processed.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let mut line = raw.trim_end().to_string();
        for rule in &driver.per_line_sub {
            line = rule.search.replace_all(&line, rule.replace.as_str()).into_owned();
        }
        if line.trim().is_empty() {
            continue;
        }

        let indent = indent_columns(&line, driver.indentation) as i64
            + (adjust_stack.len() * driver.indentation) as i64;
        track_adjust_markers(driver, &line, &mut adjust_stack);

        while indents.last().is_some_and(|&open| open >= indent) {
            indents.pop();
            path.pop();
            path_texts.pop();
        }
        if let Some(&parent_indent) = indents.last() {
            if indent > parent_indent + driver.indentation as i64 {
                warn!(
                    line = line_number + 1,
                    "indentation jumps more than one step; attaching to nearest ancestor"
                );
            }
        }

        let text = line.trim();
        let parent_path: Vec<&str> = path_texts.iter().map(String::as_str).collect();
        let allows_duplicate = driver.allows_duplicate_child(&parent_path);
        let parent = node_at_path_mut(root, &path);
        let index = match parent.child_position(text) {
            // Re-entering a section extends the existing node
            Some(existing) if !allows_duplicate => existing,
            _ => {
                parent.push_child(ConfigNode::new(text));
                parent.children().len() - 1
            }
        };
        indents.push(indent);
        path.push(index);
        path_texts.push(text.to_string());
    }

    Ok(())
}

/// Close the innermost open adjust region or open a new one, after the
/// current line's indent has been taken
fn track_adjust_markers(driver: &Driver, line: &str, adjust_stack: &mut Vec<usize>) {
    if let Some(&open) = adjust_stack.last() {
        if driver.indent_adjust[open].end_expr.is_match(line) {
            adjust_stack.pop();
            return;
        }
    }
    if let Some(position) = driver
        .indent_adjust
        .iter()
        .position(|rule| rule.start_expr.is_match(line))
    {
        adjust_stack.push(position);
    }
}

fn indent_columns(line: &str, tab_width: usize) -> usize {
    let mut columns = 0;
    for ch in line.chars() {
        match ch {
            ' ' => columns += 1,
            '\t' => columns += tab_width.max(1),
            _ => break,
        }
    }
    columns
}

fn node_at_path_mut<'a>(root: &'a mut ConfigNode, path: &[usize]) -> &'a mut ConfigNode {
    let mut cursor = root;
    for &index in path {
        cursor = cursor.child_at_mut(index);
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{driver_for, Platform};

    fn parse_with(platform: Platform, text: &str) -> ConfigNode {
        let mut root = ConfigNode::default();
        parse(driver_for(platform), text, &mut root).unwrap();
        root
    }

    #[test]
    fn test_nested_sections() {
        let root = parse_with(
            Platform::Generic,
            "router bgp 65000\n  address-family ipv4\n    network 10.0.0.0\n  neighbor 10.0.0.1\nhostname r1\n",
        );
        let bgp = root.child_by_text("router bgp 65000").unwrap();
        assert_eq!(bgp.children().len(), 2);
        let af = bgp.child_by_text("address-family ipv4").unwrap();
        assert_eq!(af.children()[0].text, "network 10.0.0.0");
        assert!(root.child_by_text("hostname r1").is_some());
    }

    #[test]
    fn test_per_line_sub_drops_chatter() {
        let root = parse_with(
            Platform::CiscoIos,
            "Building configuration...\n!\nhostname r1\nntp clock-period 17179\n",
        );
        let texts: Vec<&str> = root.children().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["hostname r1"]);
    }

    #[test]
    fn test_full_text_sub_joins_continuations() {
        let root = parse_with(Platform::CiscoIos, "snmp-server location first \\\n  floor\n");
        assert_eq!(root.children()[0].text, "snmp-server location first floor");
    }

    #[test]
    fn test_reentered_section_merges() {
        let root = parse_with(
            Platform::Generic,
            "interface Vlan2\n  description one\ninterface Vlan2\n  shutdown\n",
        );
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children()[0].children().len(), 2);
    }

    #[test]
    fn test_duplicate_children_allowed_by_rule() {
        let root = parse_with(
            Platform::CiscoIos,
            "ip access-list extended EDGE\n  remark boundary\n  permit tcp any any eq 443\n  remark boundary\n",
        );
        // Sequence numbering makes the remarks distinct again, but both
        // entries must survive the parse.
        assert_eq!(root.children()[0].children().len(), 3);
    }

    #[test]
    fn test_over_indented_line_attaches_to_nearest_ancestor() {
        let root = parse_with(Platform::Generic, "interface Vlan2\n      shutdown\n");
        assert_eq!(root.children()[0].children()[0].text, "shutdown");
    }

    #[test]
    fn test_fortios_markers_give_virtual_indent() {
        let root = parse_with(
            Platform::Fortios,
            "config system global\nset hostname fw1\nend\nconfig system dns\nset primary 10.0.0.53\nend\n",
        );
        let texts: Vec<&str> = root.children().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["config system global", "config system dns"]);
        assert_eq!(root.children()[0].children()[0].text, "set hostname fw1");
    }
}
