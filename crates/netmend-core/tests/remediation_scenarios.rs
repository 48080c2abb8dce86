//! End-to-end remediation scenarios with literal inputs and outputs
//!
//! Each test parses running/generated texts for a real platform and checks
//! the rendered remediation verbatim.

use netmend_core::{remediate, Config, Platform, RemediationWorkflow, Result};
use std::collections::BTreeSet;

fn parse(platform: Platform, text: &str) -> Config {
    Config::parse(platform, text).expect("fixture parses")
}

#[test]
fn vlan_addition_with_idempotent_rename() -> Result<()> {
    // `name new` supersedes `name old` by idempotent-command rule; no
    // explicit negation appears.
    let running = parse(Platform::CiscoIos, "vlan 3\n  name old\n");
    let generated = parse(
        Platform::CiscoIos,
        "vlan 3\n  name new\nvlan 4\n  name v4\n",
    );
    let remediation = remediate(&running, &generated)?;
    assert_eq!(
        remediation.text(),
        "vlan 3\n  name new\nvlan 4\n  name v4\n"
    );
    Ok(())
}

#[test]
fn interface_shutdown_toggle() -> Result<()> {
    let running = parse(Platform::CiscoIos, "interface Vlan2\n  shutdown\n");
    let generated = parse(Platform::CiscoIos, "interface Vlan2\n  no shutdown\n");
    let remediation = remediate(&running, &generated)?;
    assert_eq!(remediation.text(), "interface Vlan2\n  no shutdown\n");
    Ok(())
}

#[test]
fn negate_with_rule_rewrites_logging_console() -> Result<()> {
    let running = parse(Platform::CiscoIos, "logging console debugging\n");
    let generated = parse(Platform::CiscoIos, "");
    let remediation = remediate(&running, &generated)?;
    assert_eq!(remediation.text(), "no logging console\n");
    Ok(())
}

#[test]
fn rollback_restores_the_original_name_and_drops_the_new_vlan() -> Result<()> {
    let running = parse(Platform::CiscoIos, "vlan 3\n  name old\n");
    let generated = parse(
        Platform::CiscoIos,
        "vlan 3\n  name new\nvlan 4\n  name v4\n",
    );
    let workflow = RemediationWorkflow::new(running, generated)?;
    let rollback = workflow.rollback_config()?;
    assert_eq!(rollback.text(), "vlan 3\n  name old\nno vlan 4\n");
    Ok(())
}

#[test]
fn junos_flat_negation_deletes_the_full_path() -> Result<()> {
    let running = parse(
        Platform::JuniperJunos,
        "set interfaces irb unit 2 family inet disable\n",
    );
    let generated = parse(Platform::JuniperJunos, "");
    let remediation = remediate(&running, &generated)?;
    assert_eq!(
        remediation.text(),
        "delete interfaces irb unit 2 family inet disable\n"
    );
    Ok(())
}

#[test]
fn junos_flat_addition_and_deletion_coexist() -> Result<()> {
    let running = parse(
        Platform::JuniperJunos,
        "set interfaces irb unit 2 family inet disable\nset system host-name r1\n",
    );
    let generated = parse(
        Platform::JuniperJunos,
        "set system host-name r1\nset system services ssh\n",
    );
    let remediation = remediate(&running, &generated)?;
    assert_eq!(
        remediation.text(),
        "delete interfaces irb unit 2 family inet disable\nset system services ssh\n"
    );
    Ok(())
}

#[test]
fn tag_filter_keeps_only_ntp_subtrees() -> Result<()> {
    let running = parse(Platform::CiscoIos, "ntp server 10.0.0.1\n");
    let generated = parse(
        Platform::CiscoIos,
        "ntp server 10.0.0.2\nhostname new-name\n",
    );
    let mut workflow = RemediationWorkflow::new(running, generated)?;
    let rules = netmend_core::parse_tag_rules(
        "- lineage:\n    - startswith: [ntp, 'no ntp']\n  add_tags: ntp\n",
    )?;
    workflow.apply_remediation_tag_rules(&rules);

    let include: BTreeSet<String> = ["ntp".to_string()].into();
    let filtered = workflow.remediation_text_filtered(&include, &BTreeSet::new());
    assert_eq!(filtered, "no ntp server 10.0.0.1\nntp server 10.0.0.2\n");

    // The unfiltered remediation still carries the hostname change.
    assert!(workflow.remediation_text().contains("hostname new-name"));
    Ok(())
}

#[test]
fn vyos_shares_the_flat_statement_grammar() -> Result<()> {
    let running = parse(
        Platform::Vyos,
        "set interfaces ethernet eth0 address 10.0.0.1/24\n",
    );
    let generated = parse(
        Platform::Vyos,
        "set interfaces ethernet eth0 address 10.0.0.2/24\n",
    );
    let remediation = remediate(&running, &generated)?;
    let remediation_text = remediation.text();
    let lines: Vec<&str> = remediation_text.lines().collect();
    assert!(lines.contains(&"delete interfaces ethernet eth0 address 10.0.0.1/24"));
    assert!(lines.contains(&"set interfaces ethernet eth0 address 10.0.0.2/24"));
    Ok(())
}

#[test]
fn braced_junos_input_remediates_like_flat() -> Result<()> {
    let running = parse(
        Platform::JuniperJunos,
        "system {\n    host-name old;\n}\n",
    );
    let generated = parse(Platform::JuniperJunos, "set system host-name new\n");
    let remediation = remediate(&running, &generated)?;
    assert_eq!(
        remediation.text(),
        "delete system host-name old\nset system host-name new\n"
    );
    Ok(())
}
