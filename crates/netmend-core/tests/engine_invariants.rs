//! Engine-wide invariants over parse, render, remediate, and diff

use netmend_core::{
    parse_tag_rules, remediate, unified_diff, Config, Platform, Result,
};

fn ios(text: &str) -> Config {
    Config::parse(Platform::CiscoIos, text).expect("fixture parses")
}

const RUNNING: &str = "\
hostname edge-r1
vlan 3
  name prod
interface Vlan2
  description mgmt
  ip helper-address 10.9.9.9
interface Vlan3
  no shutdown
ntp server 10.0.0.1
";

const GENERATED: &str = "\
hostname edge-r1
vlan 3
  name prod
vlan 4
  name lab
interface Vlan2
  description mgmt
  mtu 9100
ntp server 10.0.0.2
";

#[test]
fn render_after_parse_is_stable() {
    // Round trip modulo per-line-sub rewrites and whitespace normalization:
    // a second parse/render cycle is a fixed point.
    let once = ios(RUNNING).text();
    let twice = ios(&once).text();
    assert_eq!(once, twice);
}

#[test]
fn self_remediation_is_empty() -> Result<()> {
    let config = ios(RUNNING);
    assert!(remediate(&config, &config)?.is_empty());

    let junos = Config::parse(
        Platform::JuniperJunos,
        "set system host-name r1\nset system services ssh\n",
    )?;
    assert!(remediate(&junos, &junos)?.is_empty());
    Ok(())
}

#[test]
fn remediation_from_empty_is_a_deep_copy_flagged_new() -> Result<()> {
    let generated = ios(GENERATED);
    let remediation = remediate(&ios(""), &generated)?;
    assert_eq!(remediation.text(), generated.text());
    assert!(remediation.all_children().all(|node| node.is_new_in_config));
    Ok(())
}

#[test]
fn applying_remediation_reaches_the_generated_state() -> Result<()> {
    // future() predicts the post-merge state of running with the
    // remediation overlaid; it must equal the generated config up to
    // sibling ordering.
    let running = ios(RUNNING);
    let generated = ios(GENERATED);
    let remediation = remediate(&running, &generated)?;
    let future = running.future(&remediation)?;
    assert!(unified_diff(&future, &generated).is_empty());
    Ok(())
}

#[test]
fn tag_application_is_idempotent() -> Result<()> {
    let rules = parse_tag_rules(
        "- lineage:\n    - startswith: [ntp, 'no ntp']\n  add_tags: ntp\n- lineage:\n    - startswith: interface\n  add_tags: ifc\n",
    )?;
    let mut once = ios(RUNNING);
    once.apply_tag_rules(&rules);
    let mut twice = once.clone();
    twice.apply_tag_rules(&rules);
    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn unified_diff_reverses_with_signs_swapped() {
    let left = ios(RUNNING);
    let right = ios(GENERATED);
    let forward = unified_diff(&left, &right);
    let backward = unified_diff(&right, &left);

    let swap = |line: &str| -> String {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        match trimmed.strip_prefix("- ") {
            Some(rest) => format!("{indent}+ {rest}"),
            None => match trimmed.strip_prefix("+ ") {
                Some(rest) => format!("{indent}- {rest}"),
                None => line.to_string(),
            },
        }
    };

    let mut forward_sorted = forward;
    forward_sorted.sort();
    let mut backward_swapped: Vec<String> =
        backward.iter().map(|line| swap(line)).collect();
    backward_swapped.sort();
    assert_eq!(forward_sorted, backward_swapped);
}

#[test]
fn remediation_double_application_is_stable() -> Result<()> {
    // Remediating the predicted future state against generated needs no
    // further edits.
    let running = ios(RUNNING);
    let generated = ios(GENERATED);
    let remediation = remediate(&running, &generated)?;
    let future = running.future(&remediation)?;
    let residual = remediate(&future, &generated)?;
    assert!(
        residual.is_empty(),
        "unexpected residual edits:\n{}",
        residual.text()
    );
    Ok(())
}

#[test]
fn child_index_agrees_with_children() {
    let config = ios(RUNNING);
    for node in config.all_children() {
        for child in node.children() {
            let found = node
                .child_by_text(&child.text)
                .expect("indexed child resolves");
            assert_eq!(found.text, child.text);
        }
    }
}
