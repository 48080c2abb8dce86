//! netmend core library
//!
//! A hierarchical network-configuration engine: it parses device
//! configuration text into sibling-ordered trees, diffs a running tree
//! against a generated tree under a platform driver's rules, and emits the
//! minimal edit set (and its rollback) as device-ready text. No network I/O
//! is performed; callers read files and pass text in.
//!
//! # Quick Start
//!
//! ```rust
//! use netmend_core::{Config, Platform, RemediationWorkflow};
//!
//! let running = Config::parse(Platform::CiscoIos, "vlan 3\n  name old\n")?;
//! let generated = Config::parse(Platform::CiscoIos, "vlan 3\n  name new\n")?;
//! let workflow = RemediationWorkflow::new(running, generated)?;
//! assert_eq!(workflow.remediation_text(), "vlan 3\n  name new\n");
//! # Ok::<(), netmend_core::Error>(())
//! ```
//!
//! # Architecture
//!
//! - [`tree`] - the owned configuration tree and its mutation algebra
//! - [`driver`] - per-platform declarative rule bundles and the registry
//! - parser - indented (Cisco-style) and flat (`set`/`delete`) parsing,
//!   reached through [`Config::parse`]
//! - [`remediation`] - the diff/edit engine and [`RemediationWorkflow`]
//! - [`tags`] - additive tag rules and tag-filtered rendering
//! - [`diff`] - tree-aware unified diff
//! - [`report`] - multi-device union reporting
//! - [`views`] - read-only semantic lookups layered on the public API

pub mod diff;
pub mod driver;
pub mod error;
pub mod match_rule;
mod parser;
pub mod remediation;
pub mod report;
pub mod tags;
pub mod tree;
pub mod views;

pub use diff::unified_diff;
pub use driver::{driver_for, ConfigStyle, Driver, Platform};
pub use error::{Error, Result};
pub use match_rule::{lineage_matches, MatchMode, MatchRule};
pub use remediation::{remediate, rollback, RemediationWorkflow};
pub use report::UnionReport;
pub use tags::{parse_tag_rules, TagRule};
pub use tree::node::{ConfigNode, NodeInstance};
pub use tree::{Config, DumpNode};

/// Parse configuration text for a platform
///
/// Convenience alias for [`Config::parse`].
///
/// # Errors
/// Returns [`Error::Parse`] for malformed input.
pub fn parse(platform: Platform, text: &str) -> Result<Config> {
    Config::parse(platform, text)
}

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::match_rule::{MatchMode, MatchRule};
    pub use crate::remediation::{remediate, rollback, RemediationWorkflow};
    pub use crate::tags::{parse_tag_rules, TagRule};
    pub use crate::tree::{Config, DumpNode};
    pub use crate::driver::{driver_for, Platform};
}
