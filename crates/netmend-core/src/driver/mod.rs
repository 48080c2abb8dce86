//! Platform drivers
//!
//! A [`Driver`] is an immutable bundle of declarative rule collections plus a
//! handful of scalar behaviors (negation prefix, declaration prefix,
//! indentation, config style) for one device operating system. Drivers are
//! built once into a process-wide registry and never mutated; every regex a
//! driver carries is compiled at construction time.

pub mod platforms;

use crate::error::{Error, Result};
use crate::match_rule::{MatchRule, any_lineage_matches, lineage_matches, MatchMode};
use crate::tree::node::{ConfigNode, DEFAULT_WEIGHT};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Supported device operating systems
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Arista EOS
    AristaEos,
    /// Cisco IOS / IOS-XE
    CiscoIos,
    /// Cisco NX-OS
    CiscoNxos,
    /// Cisco IOS-XR
    CiscoXr,
    /// Fortinet FortiOS
    Fortios,
    /// Indentation-structured config with no platform rules
    Generic,
    /// Juniper Junos (flat `set`/`delete` statements)
    JuniperJunos,
    /// VyOS (flat `set`/`delete` statements)
    Vyos,
}

impl Platform {
    /// Parse a platform name, mapping failures to the engine error type
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedPlatform`] for unknown names.
    pub fn lookup(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::UnsupportedPlatform(name.to_string()))
    }
}

/// Whether a platform's text is indentation-structured or flat statements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStyle {
    /// Cisco-style indented command tree
    Indented,
    /// Junos-style `set`/`delete` statements
    Flat,
}

/// Negate a matching node with fixed replacement text
#[derive(Debug, Clone)]
pub struct NegateWithRule {
    /// Lineage selecting the nodes this rule covers
    pub lineage: Vec<MatchRule>,
    /// Replacement negation text
    pub use_text: String,
}

/// Closing token appended to a matching section in remediation output
#[derive(Debug, Clone)]
pub struct SectionalExitingRule {
    /// Lineage selecting the sections this rule covers
    pub lineage: Vec<MatchRule>,
    /// The closing token, e.g. `exit-address-family`
    pub exit_text: String,
}

/// Override the default sibling ordering weight
#[derive(Debug, Clone)]
pub struct OrderingRule {
    /// Lineage selecting the nodes this rule covers
    pub lineage: Vec<MatchRule>,
    /// Replacement weight; lower renders earlier
    pub weight: u32,
}

/// Regex rewrite applied to input text
#[derive(Debug, Clone)]
pub struct SubRule {
    /// Compiled search pattern
    pub search: Regex,
    /// Replacement text (may reference capture groups)
    pub replace: String,
}

impl SubRule {
    /// Build a substitution rule, compiling the pattern eagerly
    ///
    /// # Errors
    /// Returns [`Error::InvalidRule`] if the pattern does not compile.
    pub fn new(search: &str, replace: &str) -> Result<Self> {
        let search = Regex::new(search)
            .map_err(|e| Error::InvalidRule(format!("bad pattern {search:?}: {e}")))?;
        Ok(Self {
            search,
            replace: replace.to_string(),
        })
    }
}

/// Virtual indent increment between matching open/close marker lines
#[derive(Debug, Clone)]
pub struct IndentAdjustRule {
    /// Marker opening a virtually indented region
    pub start_expr: Regex,
    /// Marker closing the region
    pub end_expr: Regex,
}

impl IndentAdjustRule {
    /// Build an indent-adjust rule, compiling both markers eagerly
    ///
    /// # Errors
    /// Returns [`Error::InvalidRule`] if either pattern does not compile.
    pub fn new(start_expr: &str, end_expr: &str) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::InvalidRule(format!("bad pattern {pattern:?}: {e}")))
        };
        Ok(Self {
            start_expr: compile(start_expr)?,
            end_expr: compile(end_expr)?,
        })
    }
}

/// Post-parse fixup applied to a freshly built tree
pub type PostLoadCallback = fn(&mut ConfigNode);

/// Immutable rule bundle and behaviors for a single platform
#[derive(Debug, Clone)]
pub struct Driver {
    /// The platform this driver serves
    pub platform: Platform,
    /// Indented or flat text structure
    pub style: ConfigStyle,
    /// Rendered indentation width in columns per depth step
    pub indentation: usize,
    /// Prefix producing a negation, e.g. `no ` or `delete `
    pub negation_prefix: String,
    /// Prefix carried by positive statements, e.g. `set ` (empty when none)
    pub declaration_prefix: String,
    /// Fixed-text negations for matching nodes
    pub negate_with: Vec<NegateWithRule>,
    /// Nodes negated with `default ` instead of the negation prefix
    pub negation_default_when: Vec<Vec<MatchRule>>,
    /// Closing tokens for matching sections
    pub sectional_exiting: Vec<SectionalExitingRule>,
    /// Sections replaced wholesale (negate then re-add) when both sides
    /// carry them with differing bodies
    pub sectional_overwrite: Vec<Vec<MatchRule>>,
    /// Sections replaced wholesale without a leading negation
    pub sectional_overwrite_no_negate: Vec<Vec<MatchRule>>,
    /// Sibling ordering overrides
    pub ordering: Vec<OrderingRule>,
    /// Line-by-line rewrites applied at parse time
    pub per_line_sub: Vec<SubRule>,
    /// Whole-input rewrites applied before line splitting
    pub full_text_sub: Vec<SubRule>,
    /// Command families where a newer sibling supersedes an older one
    /// without explicit negation
    pub idempotent_commands: Vec<Vec<MatchRule>>,
    /// Nodes never negated at all
    pub idempotent_commands_avoid: Vec<Vec<MatchRule>>,
    /// Virtual indentation regions for marker-structured text
    pub indent_adjust: Vec<IndentAdjustRule>,
    /// Parents whose lineage permits duplicate child texts
    pub parent_allows_duplicate_child: Vec<Vec<MatchRule>>,
    /// Post-parse tree fixups, applied in order
    pub post_load_callbacks: Vec<PostLoadCallback>,
    /// Object definitions whose removal is deferred behind the edits that
    /// drop references to them
    pub unused_object_rules: Vec<Vec<MatchRule>>,
}

/// Order weight floor applied to matching unused-object removals
pub const UNUSED_OBJECT_WEIGHT: u32 = 700;

/// Order weight assigned to synthetic sectional-exit leaves
pub const SECTIONAL_EXIT_WEIGHT: u32 = u32::MAX;

impl Driver {
    /// Empty driver for an indented platform with default scalars
    #[must_use]
    pub fn indented(platform: Platform) -> Self {
        Self {
            platform,
            style: ConfigStyle::Indented,
            indentation: 2,
            negation_prefix: "no ".to_string(),
            declaration_prefix: String::new(),
            negate_with: Vec::new(),
            negation_default_when: Vec::new(),
            sectional_exiting: Vec::new(),
            sectional_overwrite: Vec::new(),
            sectional_overwrite_no_negate: Vec::new(),
            ordering: Vec::new(),
            per_line_sub: Vec::new(),
            full_text_sub: Vec::new(),
            idempotent_commands: Vec::new(),
            idempotent_commands_avoid: Vec::new(),
            indent_adjust: Vec::new(),
            parent_allows_duplicate_child: Vec::new(),
            post_load_callbacks: Vec::new(),
            unused_object_rules: Vec::new(),
        }
    }

    /// Empty driver for a flat `set`/`delete` platform
    #[must_use]
    pub fn flat(platform: Platform) -> Self {
        Self {
            style: ConfigStyle::Flat,
            negation_prefix: "delete ".to_string(),
            declaration_prefix: "set ".to_string(),
            ..Self::indented(platform)
        }
    }

    /// Negation text for the node at the end of `path`
    ///
    /// Resolution order: a `negate_with` rule, then `default `-style
    /// negation, then swapping the negation/declaration prefixes, then
    /// prefixing with the negation prefix.
    #[must_use]
    pub fn negate_text(&self, path: &[&str]) -> String {
        let text = path.last().copied().unwrap_or_default();
        for rule in &self.negate_with {
            if lineage_matches(&rule.lineage, path, MatchMode::Floating) {
                return rule.use_text.clone();
            }
        }
        if any_lineage_matches(&self.negation_default_when, path) {
            return format!("default {text}");
        }
        if let Some(stripped) = text.strip_prefix(&self.negation_prefix) {
            return format!("{}{stripped}", self.declaration_prefix);
        }
        if !self.declaration_prefix.is_empty() {
            if let Some(stripped) = text.strip_prefix(&self.declaration_prefix) {
                return format!("{}{stripped}", self.negation_prefix);
            }
        }
        format!("{}{text}", self.negation_prefix)
    }

    /// Ordering weight for the node at the end of `path`
    #[must_use]
    pub fn weight_for(&self, path: &[&str]) -> u32 {
        for rule in &self.ordering {
            if lineage_matches(&rule.lineage, path, MatchMode::Floating) {
                return rule.weight;
            }
        }
        DEFAULT_WEIGHT
    }

    /// Closing token for the section at the end of `path`, if any
    #[must_use]
    pub fn sectional_exit_for(&self, path: &[&str]) -> Option<&str> {
        self.sectional_exiting
            .iter()
            .find(|rule| lineage_matches(&rule.lineage, path, MatchMode::Floating))
            .map(|rule| rule.exit_text.as_str())
    }

    /// Whether the section at the end of `path` is replaced wholesale with a
    /// leading negation
    #[must_use]
    pub fn is_sectional_overwrite(&self, path: &[&str]) -> bool {
        any_lineage_matches(&self.sectional_overwrite, path)
    }

    /// Whether the section at the end of `path` is replaced wholesale
    /// without negation
    #[must_use]
    pub fn is_sectional_overwrite_no_negate(&self, path: &[&str]) -> bool {
        any_lineage_matches(&self.sectional_overwrite_no_negate, path)
    }

    /// First idempotent-command rule covering the node at the end of `path`
    #[must_use]
    pub fn idempotent_rule_for(&self, path: &[&str]) -> Option<&Vec<MatchRule>> {
        self.idempotent_commands
            .iter()
            .find(|rules| lineage_matches(rules, path, MatchMode::Floating))
    }

    /// Whether the node at the end of `path` must never be negated
    #[must_use]
    pub fn is_negation_avoided(&self, path: &[&str]) -> bool {
        any_lineage_matches(&self.idempotent_commands_avoid, path)
    }

    /// Whether a parent with this lineage may carry duplicate child texts
    #[must_use]
    pub fn allows_duplicate_child(&self, parent_path: &[&str]) -> bool {
        any_lineage_matches(&self.parent_allows_duplicate_child, parent_path)
    }

    /// Whether the node at the end of `path` is a deferred object removal
    #[must_use]
    pub fn is_unused_object(&self, path: &[&str]) -> bool {
        any_lineage_matches(&self.unused_object_rules, path)
    }

    /// Platform hook deciding whether two texts belong to the same
    /// idempotent command
    ///
    /// FortiOS requires the token after the command keyword (the field or
    /// object name) to match on both sides; every other platform relies on
    /// the rule lineage alone.
    #[must_use]
    pub fn idempotent_texts_match(&self, left: &str, right: &str) -> bool {
        match self.platform {
            Platform::Fortios => {
                let head = |text: &str| -> Vec<String> {
                    text.split_whitespace().take(2).map(ToString::to_string).collect()
                };
                head(left) == head(right)
            }
            _ => true,
        }
    }
}

static REGISTRY: Lazy<HashMap<Platform, Driver>> = Lazy::new(|| {
    Platform::iter()
        .map(|platform| {
            let driver = platforms::build(platform)
                .unwrap_or_else(|e| panic!("built-in driver table for {platform}: {e}"));
            (platform, driver)
        })
        .collect()
});

/// Driver for a platform, from the process-wide registry
///
/// The registry is initialized on first use and immutable thereafter.
#[must_use]
pub fn driver_for(platform: Platform) -> &'static Driver {
    REGISTRY
        .get(&platform)
        .unwrap_or_else(|| panic!("platform {platform} missing from registry"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_names_round_trip() {
        for platform in Platform::iter() {
            let name = platform.to_string();
            assert_eq!(Platform::lookup(&name).unwrap(), platform);
        }
    }

    #[test]
    fn test_unknown_platform_rejected() {
        assert!(matches!(
            Platform::lookup("cisco_catos"),
            Err(Error::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_registry_covers_every_platform() {
        for platform in Platform::iter() {
            assert_eq!(driver_for(platform).platform, platform);
        }
    }

    #[test]
    fn test_swap_negation_indented() {
        let driver = driver_for(Platform::Generic);
        assert_eq!(driver.negate_text(&["shutdown"]), "no shutdown");
        assert_eq!(driver.negate_text(&["no shutdown"]), "shutdown");
    }

    #[test]
    fn test_swap_negation_flat() {
        let driver = driver_for(Platform::JuniperJunos);
        assert_eq!(
            driver.negate_text(&["set system host-name r1"]),
            "delete system host-name r1"
        );
        assert_eq!(
            driver.negate_text(&["delete system host-name r1"]),
            "set system host-name r1"
        );
    }

    #[test]
    fn test_negate_with_rule_takes_priority() {
        let driver = driver_for(Platform::CiscoIos);
        assert_eq!(
            driver.negate_text(&["logging console debugging"]),
            "no logging console"
        );
    }

    #[test]
    fn test_default_when_negation() {
        let driver = driver_for(Platform::CiscoIos);
        assert_eq!(
            driver.negate_text(&["interface Vlan2", "mtu 9100"]),
            "default mtu 9100"
        );
    }

    #[test]
    fn test_fortios_idempotent_requires_matching_field() {
        let driver = driver_for(Platform::Fortios);
        assert!(driver.idempotent_texts_match("set hostname fw1", "set hostname fw2"));
        assert!(!driver.idempotent_texts_match("set hostname fw1", "set timezone 04"));
    }
}
