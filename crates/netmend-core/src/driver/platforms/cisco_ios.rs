//! Cisco IOS / IOS-XE rule table

use super::callbacks;
use crate::driver::{Driver, NegateWithRule, OrderingRule, Platform, SectionalExitingRule, SubRule};
use crate::error::Result;
use crate::match_rule::MatchRule;

pub(super) fn driver() -> Result<Driver> {
    let mut driver = Driver::indented(Platform::CiscoIos);

    driver.full_text_sub = vec![
        // Join continuation lines before any line-oriented processing
        SubRule::new(r"\\\s*\n\s*", " ")?,
    ];

    driver.per_line_sub = vec![
        SubRule::new(r"^Building configuration.*", "")?,
        SubRule::new(r"^Current configuration.*", "")?,
        SubRule::new(r"^! Last configuration change.*", "")?,
        SubRule::new(r"^! NVRAM config last updated.*", "")?,
        SubRule::new(r"^ntp clock-period .*", "")?,
        SubRule::new(r"^\s*!.*", "")?,
    ];

    driver.sectional_exiting = vec![
        SectionalExitingRule {
            lineage: vec![
                MatchRule::startswith("router bgp"),
                MatchRule::startswith("template peer-policy"),
            ],
            exit_text: "exit-peer-policy".to_string(),
        },
        SectionalExitingRule {
            lineage: vec![
                MatchRule::startswith("router bgp"),
                MatchRule::startswith("template peer-session"),
            ],
            exit_text: "exit-peer-session".to_string(),
        },
        SectionalExitingRule {
            lineage: vec![
                MatchRule::startswith("router bgp"),
                MatchRule::startswith("address-family"),
            ],
            exit_text: "exit-address-family".to_string(),
        },
    ];

    driver.ordering = vec![
        // Object definitions before the interfaces that reference them
        OrderingRule {
            lineage: vec![MatchRule::startswith("vlan")],
            weight: 200,
        },
        OrderingRule {
            lineage: vec![MatchRule::startswith("ip access-list")],
            weight: 300,
        },
        // Teardown after everything that might still reference the target
        OrderingRule {
            lineage: vec![MatchRule::startswith("no vlan")],
            weight: 700,
        },
        OrderingRule {
            lineage: vec![MatchRule::startswith("no interface")],
            weight: 700,
        },
    ];

    driver.negate_with = vec![
        NegateWithRule {
            lineage: vec![MatchRule::startswith("logging console")],
            use_text: "no logging console".to_string(),
        },
        NegateWithRule {
            lineage: vec![MatchRule::startswith("logging monitor")],
            use_text: "no logging monitor".to_string(),
        },
        NegateWithRule {
            lineage: vec![MatchRule::startswith("logging buffered")],
            use_text: "no logging buffered".to_string(),
        },
    ];

    driver.negation_default_when = vec![
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("mtu"),
        ],
        vec![MatchRule::startswith("errdisable recovery interval")],
    ];

    driver.idempotent_commands = vec![
        vec![MatchRule::startswith("hostname")],
        vec![MatchRule::startswith("ip domain name")],
        vec![MatchRule::startswith("enable secret")],
        vec![MatchRule::startswith("snmp-server location")],
        vec![MatchRule::startswith("snmp-server contact")],
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
            MatchRule::startswith("speed"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("duplex"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("switchport access vlan"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("switchport trunk native vlan"),
        ],
        vec![
            MatchRule::startswith("interface"),
            MatchRule::startswith("ip ospf cost"),
        ],
        vec![
            MatchRule::startswith("router bgp"),
            MatchRule::startswith("bgp router-id"),
        ],
        vec![
            MatchRule::startswith("router ospf"),
            MatchRule::startswith("router-id"),
        ],
        vec![
            MatchRule::startswith("line"),
            MatchRule::startswith("exec-timeout"),
        ],
    ];

    driver.idempotent_commands_avoid = vec![
        // These lines have no standalone positive form to fall back to
        vec![
            MatchRule::startswith("interface"),
            MatchRule::equals("no ip address"),
        ],
        vec![MatchRule::startswith("line con")],
    ];

    driver.parent_allows_duplicate_child = vec![vec![MatchRule::startswith_any(&[
        "ip access-list",
        "ipv6 access-list",
    ])]];

    driver.unused_object_rules = vec![
        vec![MatchRule::startswith("no ip access-list")],
        vec![MatchRule::startswith("no ipv6 access-list")],
        vec![MatchRule::startswith("no route-map")],
        vec![MatchRule::startswith("no ip prefix-list")],
    ];

    driver.post_load_callbacks = vec![callbacks::add_acl_sequence_numbers];

    Ok(driver)
}
