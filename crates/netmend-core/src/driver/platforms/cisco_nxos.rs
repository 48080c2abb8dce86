//! Cisco NX-OS rule table

use super::callbacks;
use crate::driver::{Driver, OrderingRule, Platform, SubRule};
use crate::error::Result;
use crate::match_rule::MatchRule;

pub(super) fn driver() -> Result<Driver> {
    let mut driver = Driver::indented(Platform::CiscoNxos);

    driver.per_line_sub = vec![
        SubRule::new(r"^!Command: .*", "")?,
        SubRule::new(r"^!Time: .*", "")?,
        SubRule::new(r"^!Running configuration last done at.*", "")?,
        SubRule::new(r"^version .*", "")?,
        SubRule::new(r"^\s*!.*", "")?,
    ];

    driver.ordering = vec![
        // Features must exist before any section that depends on them and
        // disappear only after those sections are gone
        OrderingRule {
            lineage: vec![MatchRule::startswith("feature")],
            weight: 100,
        },
        OrderingRule {
            lineage: vec![MatchRule::startswith("no feature")],
            weight: 700,
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
            MatchRule::startswith("mtu"),
        ],
        vec![
            MatchRule::startswith("router bgp"),
            MatchRule::startswith("router-id"),
        ],
    ];

    driver.parent_allows_duplicate_child = vec![vec![MatchRule::startswith_any(&[
        "ip access-list",
        "ipv6 access-list",
    ])]];

    driver.post_load_callbacks = vec![callbacks::strip_ipv6_acl_sequence_numbers];

    Ok(driver)
}
