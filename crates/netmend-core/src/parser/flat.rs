//! Junos-style flat statement parser
//!
//! `set a b c` walks/creates the token path `a -> b -> c`; `delete a b c`
//! does the same and marks the leaf negated. Braced saved configs are
//! converted to flat `set` statements first, then parsed the same way.
//! Double-quoted spans count as one token.

use crate::error::{Error, Result};
use crate::tree::node::ConfigNode;

pub(super) fn parse(text: &str, root: &mut ConfigNode) -> Result<()> {
    let flat;
    let statements = if is_braced(text) {
        flat = braced_to_flat(text)?;
        flat.as_str()
    } else {
        text
    };

    for (line_number, raw) in statements.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        let line = line.strip_suffix(';').unwrap_or(line);
        let tokens = split_tokens(line, line_number + 1)?;
        let (negated, segments) = match tokens.first().map(String::as_str) {
            Some("set") => (false, &tokens[1..]),
            Some("delete") => (true, &tokens[1..]),
            _ => {
                return Err(Error::Parse {
                    line: line_number + 1,
                    message: "expected `set` or `delete`".to_string(),
                    text: line.to_string(),
                });
            }
        };
        if segments.is_empty() {
            return Err(Error::Parse {
                line: line_number + 1,
                message: "statement has no path".to_string(),
                text: line.to_string(),
            });
        }
        let mut cursor: &mut ConfigNode = root;
        for segment in segments {
            cursor = cursor.get_or_add_child(segment);
        }
        if negated {
            cursor.negated = true;
        }
    }
    Ok(())
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("/*") || line.starts_with('*')
}

fn is_braced(text: &str) -> bool {
    text.lines().any(|line| line.trim_end().ends_with('{'))
}

/// Convert the braced grammar to flat `set` statements
fn braced_to_flat(text: &str) -> Result<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut statements: Vec<String> = Vec::new();

    for (line_number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || is_comment(line) {
            continue;
        }
        if line == "}" || line == "};" {
            if sections.pop().is_none() {
                return Err(Error::Parse {
                    line: line_number + 1,
                    message: "unbalanced closing brace".to_string(),
                    text: line.to_string(),
                });
            }
        } else if let Some(head) = line.strip_suffix('{') {
            sections.push(head.trim().to_string());
        } else if let Some(body) = line.strip_suffix(';') {
            let body = body.trim();
            if body.is_empty() {
                continue;
            }
            let mut statement = String::from("set");
            for section in &sections {
                statement.push(' ');
                statement.push_str(section);
            }
            statement.push(' ');
            statement.push_str(body);
            statements.push(statement);
        } else {
            return Err(Error::Parse {
                line: line_number + 1,
                message: "statement missing `;` terminator".to_string(),
                text: line.to_string(),
            });
        }
    }
    if sections.is_empty() {
        Ok(statements.join("\n"))
    } else {
        Err(Error::Parse {
            line: text.lines().count(),
            message: format!("{} unclosed brace(s)", sections.len()),
            text: sections.join(" / "),
        })
    }
}

/// Whitespace split keeping double-quoted spans atomic, quotes retained
fn split_tokens(line: &str, line_number: usize) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if in_quotes {
        return Err(Error::Parse {
            line: line_number,
            message: "unterminated quote".to_string(),
            text: line.to_string(),
        });
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_junos(text: &str) -> ConfigNode {
        let mut root = ConfigNode::default();
        parse(text, &mut root).unwrap();
        root
    }

    #[test]
    fn test_set_builds_token_path() {
        let root = parse_junos("set interfaces irb unit 2 family inet disable\n");
        let mut cursor = &root;
        for segment in ["interfaces", "irb", "unit", "2", "family", "inet", "disable"] {
            cursor = cursor.child_by_text(segment).unwrap();
        }
        assert!(cursor.is_leaf());
        assert!(!cursor.negated);
    }

    #[test]
    fn test_delete_marks_leaf_negated() {
        let root = parse_junos("delete interfaces irb unit 2\n");
        let unit = root
            .child_by_text("interfaces")
            .and_then(|n| n.child_by_text("irb"))
            .and_then(|n| n.child_by_text("unit"))
            .and_then(|n| n.child_by_text("2"))
            .unwrap();
        assert!(unit.negated);
    }

    #[test]
    fn test_shared_prefixes_merge() {
        let root = parse_junos(
            "set interfaces ge-0/0/0 unit 0 family inet address 10.0.0.1/30\nset interfaces ge-0/0/0 description uplink\n",
        );
        let interface = root
            .child_by_text("interfaces")
            .and_then(|n| n.child_by_text("ge-0/0/0"))
            .unwrap();
        assert_eq!(interface.children().len(), 2);
    }

    #[test]
    fn test_quoted_description_is_one_token() {
        let root = parse_junos("set interfaces ge-0/0/0 description \"core uplink\"\n");
        let description = root
            .child_by_text("interfaces")
            .and_then(|n| n.child_by_text("ge-0/0/0"))
            .and_then(|n| n.child_by_text("description"))
            .unwrap();
        assert_eq!(description.children()[0].text, "\"core uplink\"");
    }

    #[test]
    fn test_braced_input_converted() {
        let root = parse_junos(
            "system {\n    host-name r1;\n    services {\n        ssh;\n    }\n}\n",
        );
        let system = root.child_by_text("system").unwrap();
        assert!(system.child_by_text("host-name").is_some());
        let services = system.child_by_text("services").unwrap();
        assert!(services.child_by_text("ssh").is_some());
    }

    #[test]
    fn test_malformed_head_token_rejected() {
        let mut root = ConfigNode::default();
        let err = parse("activate interfaces irb\n", &mut root).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        let mut root = ConfigNode::default();
        let err = parse("system {\n    host-name r1;\n", &mut root).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
