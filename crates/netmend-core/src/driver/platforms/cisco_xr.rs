//! Cisco IOS-XR rule table

use crate::driver::{Driver, Platform, SectionalExitingRule, SubRule};
use crate::error::Result;
use crate::match_rule::MatchRule;

pub(super) fn driver() -> Result<Driver> {
    let mut driver = Driver::indented(Platform::CiscoXr);

    driver.per_line_sub = vec![
        SubRule::new(r"^Building configuration.*", "")?,
        SubRule::new(r"^!! IOS XR Configuration.*", "")?,
        SubRule::new(r"^\s*!.*", "")?,
    ];

    // RPL bodies are order-sensitive programs; they can only be replaced
    // wholesale, never edited line by line.
    driver.sectional_overwrite = vec![vec![MatchRule::startswith("route-policy")]];
    driver.sectional_overwrite_no_negate = vec![vec![MatchRule::startswith_any(&[
        "prefix-set",
        "as-path-set",
        "community-set",
    ])]];

    driver.sectional_exiting = vec![
        SectionalExitingRule {
            lineage: vec![MatchRule::startswith("route-policy")],
            exit_text: "end-policy".to_string(),
        },
        SectionalExitingRule {
            lineage: vec![MatchRule::startswith_any(&[
                "prefix-set",
                "as-path-set",
                "community-set",
            ])],
            exit_text: "end-set".to_string(),
        },
    ];

    driver.idempotent_commands = vec![
        vec![MatchRule::startswith("hostname")],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("description"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("ipv4 address"),
        ],
        vec![
            MatchRule::startswith("router bgp"),
            MatchRule::startswith("bgp router-id"),
        ],
    ];

    Ok(driver)
}
