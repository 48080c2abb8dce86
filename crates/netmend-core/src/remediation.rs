//! Remediation engine
//!
//! Walks a running and a generated tree in parallel and emits a third tree
//! whose rendering, applied in order, transitions the device from the
//! running state to the generated state. Negation, idempotency, sectional
//! overwrite, sectional exits, and ordering all come from the platform
//! driver; the algorithm itself is platform-free.

use crate::driver::{
    ConfigStyle, Driver, SECTIONAL_EXIT_WEIGHT, UNUSED_OBJECT_WEIGHT,
};
use crate::error::Result;
use crate::match_rule::{lineage_matches, MatchMode};
use crate::tags::TagRule;
use crate::tree::node::ConfigNode;
use crate::tree::Config;
use once_cell::unsync::OnceCell;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Compute the edits that transition `running` into `generated`
///
/// # Errors
/// Returns [`crate::Error::PlatformMismatch`] when the operands were parsed
/// for different platforms.
pub fn remediate(running: &Config, generated: &Config) -> Result<Config> {
    running.ensure_same_platform(generated)?;
    let driver = running.driver();
    let mut root = ConfigNode::default();
    let mut path: Vec<String> = Vec::new();

    remediate_children(driver, running.root(), generated.root(), &mut path, &mut root);
    assign_weights(driver, &mut root, &mut path);
    if driver.style == ConfigStyle::Indented {
        add_sectional_exits(driver, &mut root, &mut path);
    }
    defer_unused_objects(driver, &mut root, &mut path);

    let remediation = Config::from_root(running.platform(), root);
    info!(
        platform = %running.platform(),
        edits = remediation.all_children().count(),
        "computed remediation"
    );
    Ok(remediation)
}

/// Compute the inverse edit set: the same algorithm with the operands
/// swapped
///
/// # Errors
/// Returns [`crate::Error::PlatformMismatch`] across platforms.
pub fn rollback(running: &Config, generated: &Config) -> Result<Config> {
    remediate(generated, running)
}

fn remediate_children(
    driver: &Driver,
    running: &ConfigNode,
    generated: &ConfigNode,
    path: &mut Vec<String>,
    out: &mut ConfigNode,
) {
    let parent_path: Vec<&str> = path.iter().map(String::as_str).collect();
    let allows_duplicate = driver.allows_duplicate_child(&parent_path);

    // Negations: running children with no generated counterpart.
    for absent in running.children() {
        if generated.has_child(&absent.text) {
            continue;
        }
        path.push(absent.text.clone());
        emit_negation(driver, absent, running, generated, path, allows_duplicate, out);
        path.pop();
    }

    // Additions and recursion, in generated order.
    for wanted in generated.children() {
        match running.child_by_text(&wanted.text) {
            None => {
                attach(out, wanted.deep_copy_marked_new(), allows_duplicate);
            }
            Some(present) => {
                path.push(wanted.text.clone());
                let refs: Vec<&str> = path.iter().map(String::as_str).collect();
                if driver.is_sectional_overwrite(&refs) {
                    if !present.subtree_text_eq(wanted) {
                        let mut negation = ConfigNode::new(driver.negate_text(&refs));
                        negation.is_new_in_config = true;
                        attach(out, negation, allows_duplicate);
                        attach(out, wanted.deep_copy_marked_new(), allows_duplicate);
                    }
                } else if driver.is_sectional_overwrite_no_negate(&refs) {
                    if !present.subtree_text_eq(wanted) {
                        attach(out, wanted.deep_copy_marked_new(), allows_duplicate);
                    }
                } else {
                    let mut section = wanted.shallow_copy();
                    remediate_children(driver, present, wanted, path, &mut section);
                    if !section.is_leaf() {
                        attach(out, section, allows_duplicate);
                    }
                }
                path.pop();
            }
        }
    }
}

/// Emit the negation for a running-only child, unless a driver rule
/// suppresses it
#[allow(clippy::too_many_arguments)]
fn emit_negation(
    driver: &Driver,
    absent: &ConfigNode,
    running: &ConfigNode,
    generated: &ConfigNode,
    path: &[String],
    allows_duplicate: bool,
    out: &mut ConfigNode,
) {
    let refs: Vec<&str> = path.iter().map(String::as_str).collect();
    if driver.is_negation_avoided(&refs) {
        debug!(text = %absent.text, "negation avoided by rule");
        return;
    }
    if let Some(rule) = driver.idempotent_rule_for(&refs) {
        // The replacement command emitted by the additions pass already
        // supersedes this one.
        for replacement in generated.children() {
            if replacement.text == absent.text || running.has_child(&replacement.text) {
                continue;
            }
            if !driver.idempotent_texts_match(&absent.text, &replacement.text) {
                continue;
            }
            let mut replacement_path = refs.clone();
            replacement_path.pop();
            replacement_path.push(replacement.text.as_str());
            if lineage_matches(rule, &replacement_path, MatchMode::Floating) {
                debug!(text = %absent.text, "negation superseded by idempotent replacement");
                return;
            }
        }
    }
    match driver.style {
        ConfigStyle::Flat => {
            // Flat platforms negate whole branches; every leaf under the
            // marked node renders as a `delete` statement.
            let mut removal = absent.deep_copy_marked_new();
            removal.negated = !absent.negated;
            attach(out, removal, allows_duplicate);
        }
        ConfigStyle::Indented => {
            let mut negation = ConfigNode::new(driver.negate_text(&refs));
            negation.is_new_in_config = true;
            attach(out, negation, allows_duplicate);
        }
    }
}

/// Attach a node to the output, merging into an existing same-text sibling
/// unless the parent carries duplicates
fn attach(out: &mut ConfigNode, node: ConfigNode, allows_duplicate: bool) {
    if !allows_duplicate && out.has_child(&node.text) {
        if let Some(existing) = out.child_by_text_mut(&node.text) {
            for child in node.into_children() {
                attach(existing, child, false);
            }
        }
        return;
    }
    out.push_child(node);
}

fn assign_weights(driver: &Driver, node: &mut ConfigNode, path: &mut Vec<String>) {
    for child in node.children_mut() {
        path.push(child.text.clone());
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        child.order_weight = driver.weight_for(&refs);
        assign_weights(driver, child, path);
        path.pop();
    }
}

fn add_sectional_exits(driver: &Driver, node: &mut ConfigNode, path: &mut Vec<String>) {
    for child in node.children_mut() {
        if child.is_leaf() {
            continue;
        }
        path.push(child.text.clone());
        add_sectional_exits(driver, child, path);
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        if let Some(exit_text) = driver.sectional_exit_for(&refs) {
            let mut exit = ConfigNode::new(exit_text);
            exit.is_new_in_config = true;
            exit.order_weight = SECTIONAL_EXIT_WEIGHT;
            child.push_child(exit);
        }
        path.pop();
    }
}

/// Push object removals behind the edits that drop references to them
fn defer_unused_objects(driver: &Driver, node: &mut ConfigNode, path: &mut Vec<String>) {
    for child in node.children_mut() {
        path.push(child.text.clone());
        let refs: Vec<&str> = path.iter().map(String::as_str).collect();
        if driver.is_unused_object(&refs) {
            child.order_weight = child.order_weight.max(UNUSED_OBJECT_WEIGHT);
        }
        defer_unused_objects(driver, child, path);
        path.pop();
    }
}

/// Remediation and rollback for one running/generated pair
///
/// The remediation is computed at construction; the rollback lazily on
/// first use. Tag rules applied through the workflow affect only the
/// remediation tree.
#[derive(Debug)]
pub struct RemediationWorkflow {
    running: Config,
    generated: Config,
    remediation: Config,
    rollback: OnceCell<Config>,
}

impl RemediationWorkflow {
    /// Build a workflow over a running/generated pair
    ///
    /// # Errors
    /// Returns [`crate::Error::PlatformMismatch`] across platforms.
    pub fn new(running: Config, generated: Config) -> Result<Self> {
        let remediation = remediate(&running, &generated)?;
        Ok(Self {
            running,
            generated,
            remediation,
            rollback: OnceCell::new(),
        })
    }

    /// The running config the workflow was built over
    #[must_use]
    pub fn running(&self) -> &Config {
        &self.running
    }

    /// The generated config the workflow was built over
    #[must_use]
    pub fn generated(&self) -> &Config {
        &self.generated
    }

    /// The edits transitioning running into generated
    #[must_use]
    pub fn remediation_config(&self) -> &Config {
        &self.remediation
    }

    /// The inverse edit set, computed on first use
    ///
    /// # Errors
    /// Propagates the platform check; unreachable after successful
    /// construction.
    pub fn rollback_config(&self) -> Result<&Config> {
        self.rollback
            .get_or_try_init(|| remediate(&self.generated, &self.running))
    }

    /// Tree-aware unified diff between running and generated
    #[must_use]
    pub fn unified_diff(&self) -> Vec<String> {
        crate::diff::unified_diff(&self.running, &self.generated)
    }

    /// Apply additive tag rules to the remediation tree
    pub fn apply_remediation_tag_rules(&mut self, rules: &[TagRule]) {
        self.remediation.apply_tag_rules(rules);
    }

    /// Render the remediation
    #[must_use]
    pub fn remediation_text(&self) -> String {
        self.remediation.text()
    }

    /// Render the remediation filtered by include/exclude tag sets
    #[must_use]
    pub fn remediation_text_filtered(
        &self,
        include: &BTreeSet<String>,
        exclude: &BTreeSet<String>,
    ) -> String {
        self.remediation.filtered_text(include, exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Platform;

    fn ios(text: &str) -> Config {
        Config::parse(Platform::CiscoIos, text).unwrap()
    }

    #[test]
    fn test_identical_configs_need_no_edits() {
        let text = "vlan 3\n  name prod\ninterface Vlan2\n  shutdown\n";
        let remediation = remediate(&ios(text), &ios(text)).unwrap();
        assert!(remediation.is_empty());
    }

    #[test]
    fn test_everything_is_new_from_empty_running() {
        let generated = ios("vlan 3\n  name prod\n");
        let remediation = remediate(&ios(""), &generated).unwrap();
        assert_eq!(remediation.text(), generated.text());
        assert!(remediation.all_children().all(|n| n.is_new_in_config));
    }

    #[test]
    fn test_negation_swaps_existing_prefix() {
        let running = ios("interface Vlan2\n  no shutdown\n");
        let generated = ios("interface Vlan2\n  shutdown\n");
        let remediation = remediate(&running, &generated).unwrap();
        assert_eq!(remediation.text(), "interface Vlan2\n  shutdown\n");
    }

    #[test]
    fn test_sectional_overwrite_replaces_wholesale() {
        let running = Config::parse(
            Platform::CiscoXr,
            "route-policy EDGE-IN\n  pass\n",
        )
        .unwrap();
        let generated = Config::parse(
            Platform::CiscoXr,
            "route-policy EDGE-IN\n  drop\n",
        )
        .unwrap();
        let remediation = remediate(&running, &generated).unwrap();
        assert_eq!(
            remediation.text(),
            "no route-policy EDGE-IN\nroute-policy EDGE-IN\n  drop\n  end-policy\n"
        );
    }

    #[test]
    fn test_sectional_overwrite_skipped_when_equal() {
        let text = "route-policy EDGE-IN\n  pass\n";
        let running = Config::parse(Platform::CiscoXr, text).unwrap();
        let generated = Config::parse(Platform::CiscoXr, text).unwrap();
        assert!(remediate(&running, &generated).unwrap().is_empty());
    }

    #[test]
    fn test_sectional_exit_materialized() {
        let running = ios("router bgp 65000\n");
        let generated = ios(
            "router bgp 65000\n  address-family ipv4\n    network 10.0.0.0 mask 255.255.255.0\n",
        );
        let remediation = remediate(&running, &generated).unwrap();
        assert_eq!(
            remediation.text(),
            "router bgp 65000\n  address-family ipv4\n    network 10.0.0.0 mask 255.255.255.0\n    exit-address-family\n"
        );
    }

    #[test]
    fn test_ordering_weights_sort_teardown_last() {
        let running = ios("vlan 9\n  name dead\n");
        let generated = ios("hostname r1\n");
        let remediation = remediate(&running, &generated).unwrap();
        // `no vlan 9` carries teardown weight 700 and renders after the
        // default-weight addition despite being emitted first.
        assert_eq!(remediation.text(), "hostname r1\nno vlan 9\n");
    }

    #[test]
    fn test_negation_avoided_by_rule() {
        let running = ios("interface Vlan2\n  no ip address\n");
        let generated = ios("interface Vlan2\n");
        let remediation = remediate(&running, &generated).unwrap();
        assert!(remediation.is_empty());
    }

    #[test]
    fn test_fortios_set_superseded_per_field() {
        let fw = |text: &str| Config::parse(Platform::Fortios, text).unwrap();
        let running = fw("config system global\n    set hostname fw-old\n    set timezone 04\nend\n");
        let generated = fw("config system global\n    set hostname fw-new\nend\n");
        let remediation = remediate(&running, &generated).unwrap();
        assert_eq!(
            remediation.text(),
            "config system global\n    unset timezone 04\n    set hostname fw-new\n"
        );
    }

    #[test]
    fn test_workflow_rollback_inverts() {
        let running = ios("vlan 3\n  name old\n");
        let generated = ios("vlan 3\n  name new\nvlan 4\n  name v4\n");
        let workflow = RemediationWorkflow::new(running, generated).unwrap();
        assert_eq!(
            workflow.remediation_config().text(),
            "vlan 3\n  name new\nvlan 4\n  name v4\n"
        );
        let rollback = workflow.rollback_config().unwrap();
        assert_eq!(rollback.text(), "vlan 3\n  name old\nno vlan 4\n");
    }
}
