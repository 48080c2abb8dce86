//! Read-only configuration views
//!
//! Convenience lookups for a few vendor-agnostic semantic fields. Views are
//! collaborators of the engine: they are built strictly on the public
//! traversal API and never reach into node internals.

use crate::match_rule::MatchRule;
use crate::tree::Config;

/// Summary of one interface section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceView {
    /// Interface name, e.g. `GigabitEthernet0/1`
    pub name: String,
    /// The `description` argument, when present
    pub description: Option<String>,
    /// Whether the interface carries a `shutdown` line
    pub admin_down: bool,
}

/// The device hostname, when configured
#[must_use]
pub fn hostname(config: &Config) -> Option<String> {
    config
        .get_child(&MatchRule::startswith("hostname "))
        .map(|node| node.text["hostname ".len()..].trim().to_string())
}

/// Names of all interface sections
#[must_use]
pub fn interface_names(config: &Config) -> Vec<String> {
    config
        .children_iter_by_match_rule(&MatchRule::startswith("interface "))
        .map(|node| node.text["interface ".len()..].trim().to_string())
        .collect()
}

/// Views over all interface sections
#[must_use]
pub fn interface_views(config: &Config) -> Vec<InterfaceView> {
    config
        .children_iter_by_match_rule(&MatchRule::startswith("interface "))
        .map(|node| InterfaceView {
            name: node.text["interface ".len()..].trim().to_string(),
            description: node
                .get_child(&MatchRule::startswith("description "))
                .map(|child| child.text["description ".len()..].trim().to_string()),
            admin_down: node.has_child("shutdown"),
        })
        .collect()
}

/// View over one interface section, by name
#[must_use]
pub fn interface_view(config: &Config, name: &str) -> Option<InterfaceView> {
    interface_views(config)
        .into_iter()
        .find(|view| view.name == name)
}

/// All configured VLAN ids, in declaration order
#[must_use]
pub fn vlan_ids(config: &Config) -> Vec<u16> {
    config
        .children_iter_by_match_rule(&MatchRule::startswith("vlan "))
        .filter_map(|node| node.text["vlan ".len()..].trim().parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Platform;

    fn ios(text: &str) -> Config {
        Config::parse(Platform::CiscoIos, text).unwrap()
    }

    #[test]
    fn test_hostname_view() {
        let config = ios("hostname edge-r1\n");
        assert_eq!(hostname(&config).as_deref(), Some("edge-r1"));
        assert_eq!(hostname(&ios("vlan 3\n")), None);
    }

    #[test]
    fn test_interface_views() {
        let config = ios(
            "interface Vlan2\n  description mgmt\n  shutdown\ninterface GigabitEthernet0/1\n  no shutdown\n",
        );
        let views = interface_views(&config);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].name, "Vlan2");
        assert_eq!(views[0].description.as_deref(), Some("mgmt"));
        assert!(views[0].admin_down);
        assert_eq!(views[1].name, "GigabitEthernet0/1");
        assert!(!views[1].admin_down);
    }

    #[test]
    fn test_vlan_ids_skip_malformed() {
        let config = ios("vlan 3\nvlan 40\nvlan internal allocation policy ascending\n");
        assert_eq!(vlan_ids(&config), vec![3, 40]);
    }
}
