//! Arista EOS rule table

use crate::driver::{Driver, OrderingRule, Platform, SubRule};
use crate::error::Result;
use crate::match_rule::MatchRule;

pub(super) fn driver() -> Result<Driver> {
    let mut driver = Driver::indented(Platform::AristaEos);

    driver.per_line_sub = vec![
        SubRule::new(r"^! Command: .*", "")?,
        SubRule::new(r"^! device: .*", "")?,
        // Canonical long interface names
        SubRule::new(r"^interface Et(\d\S*)$", "interface Ethernet$1")?,
        SubRule::new(r"^interface Ma(\d\S*)$", "interface Management$1")?,
        SubRule::new(r"^\s*!.*", "")?,
    ];

    driver.ordering = vec![
        OrderingRule {
            lineage: vec![MatchRule::startswith("vlan")],
            weight: 200,
        },
        OrderingRule {
            lineage: vec![MatchRule::startswith("no vlan")],
            weight: 700,
        },
    ];

    driver.idempotent_commands = vec![
        vec![MatchRule::startswith("hostname")],
        vec![
            MatchRule::startswith("vlan"),
            MatchRule::startswith("name"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("description"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("ip address"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("switchport access vlan"),
        ],
    ];

    Ok(driver)
}
