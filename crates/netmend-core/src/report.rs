//! Multi-device union report
//!
//! Aggregates the configuration trees of many devices into one union tree,
//! recording per node which devices carry it. Aggregation must happen on
//! fully built trees; the engine itself is single-threaded.

use crate::driver::Platform;
use crate::error::{Error, Result};
use crate::tree::node::{ConfigNode, NodeInstance};
use crate::tree::Config;
use serde::Serialize;

/// Union of many devices' configuration trees
#[derive(Debug, Default)]
pub struct UnionReport {
    platform: Option<Platform>,
    devices: Vec<String>,
    union: ConfigNode,
}

impl UnionReport {
    /// Empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one device's tree into the union
    ///
    /// Devices are numbered in the order they are added, starting at 1.
    ///
    /// # Errors
    /// Returns [`Error::PlatformMismatch`] when the device's platform
    /// differs from the devices already merged.
    pub fn add_device(&mut self, name: &str, config: &Config) -> Result<()> {
        match self.platform {
            None => self.platform = Some(config.platform()),
            Some(platform) if platform != config.platform() => {
                return Err(Error::PlatformMismatch {
                    left: platform.to_string(),
                    right: config.platform().to_string(),
                });
            }
            Some(_) => {}
        }
        self.devices.push(name.to_string());
        let id = u32::try_from(self.devices.len()).unwrap_or(u32::MAX);
        union_into(&mut self.union, config.root(), id);
        Ok(())
    }

    /// Names of the merged devices, in id order
    #[must_use]
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Names of the devices carrying the node at a root-to-node text path
    #[must_use]
    pub fn devices_with(&self, path: &[&str]) -> Vec<&str> {
        let mut cursor = &self.union;
        for segment in path {
            match cursor.child_by_text(segment) {
                Some(child) => cursor = child,
                None => return Vec::new(),
            }
        }
        cursor
            .instances
            .iter()
            .filter_map(|instance| {
                self.devices.get(instance.id as usize - 1).map(String::as_str)
            })
            .collect()
    }

    /// Render the union tree, annotating lines not carried by every device
    /// with their device count
    #[must_use]
    pub fn annotated_text(&self) -> String {
        let mut out = String::new();
        render(&self.union, 0, self.devices.len(), &mut out);
        out
    }

    /// Serialize the report as pretty JSON
    ///
    /// # Errors
    /// Returns [`Error::Json`] on serialization failure.
    pub fn to_json(&self) -> Result<String> {
        let document = ReportDocument {
            platform: self.platform,
            devices: &self.devices,
            tree: self.union.children().iter().map(ReportNode::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

fn union_into(target: &mut ConfigNode, source: &ConfigNode, device: u32) {
    for child in source.children() {
        let entry = target.get_or_add_child(&child.text);
        entry.instances.push(NodeInstance {
            id: device,
            tags: child.tags.clone(),
            comments: child.comments.clone(),
        });
        union_into(entry, child, device);
    }
}

fn render(node: &ConfigNode, depth: usize, total: usize, out: &mut String) {
    for child in node.children() {
        for _ in 0..depth * 2 {
            out.push(' ');
        }
        out.push_str(&child.text);
        let count = child.instances.len();
        if count < total {
            out.push_str(&format!("  [{count}/{total}]"));
        }
        out.push('\n');
        render(child, depth + 1, total, out);
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    platform: Option<Platform>,
    devices: &'a [String],
    tree: Vec<ReportNode>,
}

#[derive(Serialize)]
struct ReportNode {
    text: String,
    devices: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ReportNode>,
}

impl From<&ConfigNode> for ReportNode {
    fn from(node: &ConfigNode) -> Self {
        Self {
            text: node.text.clone(),
            devices: node.instances.iter().map(|instance| instance.id).collect(),
            children: node.children().iter().map(Self::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ios(text: &str) -> Config {
        Config::parse(Platform::CiscoIos, text).unwrap()
    }

    #[test]
    fn test_union_counts_devices_per_line() {
        let mut report = UnionReport::new();
        report
            .add_device("r1", &ios("hostname r1\nntp server 10.0.0.1\n"))
            .unwrap();
        report
            .add_device("r2", &ios("hostname r2\nntp server 10.0.0.1\n"))
            .unwrap();

        assert_eq!(report.devices(), ["r1", "r2"]);
        assert_eq!(
            report.devices_with(&["ntp server 10.0.0.1"]),
            vec!["r1", "r2"]
        );
        assert_eq!(report.devices_with(&["hostname r1"]), vec!["r1"]);
        assert!(report.devices_with(&["snmp-server community x"]).is_empty());
    }

    #[test]
    fn test_annotated_text_marks_partial_lines() {
        let mut report = UnionReport::new();
        report.add_device("r1", &ios("ntp server 10.0.0.1\n")).unwrap();
        report
            .add_device("r2", &ios("ntp server 10.0.0.1\nntp server 10.0.0.2\n"))
            .unwrap();

        let text = report.annotated_text();
        assert!(text.contains("ntp server 10.0.0.1\n"));
        assert!(text.contains("ntp server 10.0.0.2  [1/2]\n"));
    }

    #[test]
    fn test_mixed_platforms_rejected() {
        let mut report = UnionReport::new();
        report.add_device("r1", &ios("hostname r1\n")).unwrap();
        let nxos = Config::parse(Platform::CiscoNxos, "hostname n1\n").unwrap();
        assert!(matches!(
            report.add_device("n1", &nxos),
            Err(Error::PlatformMismatch { .. })
        ));
    }

    #[test]
    fn test_json_report_shape() {
        let mut report = UnionReport::new();
        report.add_device("r1", &ios("hostname r1\n")).unwrap();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["platform"], "cisco_ios");
        assert_eq!(value["tree"][0]["devices"][0], 1);
    }
}
