//! Nessus v2 (`.nessus`) adapter for vulnerability-scan reports.

use serde::Deserialize;

use crate::parsers::{from_xml, ReportAdapter, ReportFormat};

/// Adapter for `NessusClientData_v2` documents.
#[derive(Debug, Default)]
pub struct NessusAdapter;

impl ReportAdapter for NessusAdapter {
    type Tree = NessusData;

    fn format(&self) -> ReportFormat {
        ReportFormat::Nessus
    }

    fn parse(&self, data: &[u8]) -> Result<NessusData, anyhow::Error> {
        from_xml(data)
    }

    /// A real export always names its report.
    fn confirm(&self, tree: &NessusData) -> bool {
        !tree.report.name.trim().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NessusData {
    #[serde(rename = "Report", default)]
    pub report: Report,
}

#[derive(Debug, Default, Deserialize)]
pub struct Report {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "ReportHost", default)]
    pub hosts: Vec<ReportHost>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportHost {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "HostProperties", default)]
    pub properties: HostProperties,
    #[serde(rename = "ReportItem", default)]
    pub items: Vec<ReportItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HostProperties {
    #[serde(rename = "tag", default)]
    pub tags: Vec<HostTag>,
}

/// A `<tag name="...">value</tag>` host property.
#[derive(Debug, Default, Deserialize)]
pub struct HostTag {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// One finding reported against a host.
#[derive(Debug, Default, Deserialize)]
pub struct ReportItem {
    #[serde(rename = "@port", default)]
    pub port: u16,
    #[serde(rename = "@svc_name", default)]
    pub service_name: String,
    #[serde(rename = "@protocol", default)]
    pub protocol: String,
    #[serde(rename = "@severity", default)]
    pub severity: u8,
    #[serde(rename = "@pluginID", default)]
    pub plugin_id: String,
    #[serde(rename = "@pluginName", default)]
    pub plugin_name: String,
    #[serde(rename = "@pluginFamily", default)]
    pub plugin_family: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub plugin_output: String,
    #[serde(default)]
    pub risk_factor: String,
    #[serde(default)]
    pub cvss_base_score: Option<f64>,
    #[serde(rename = "cve", default)]
    pub cves: Vec<String>,
    #[serde(default)]
    pub exploit_available: bool,
    #[serde(default)]
    pub exploit_framework_metasploit: bool,
    #[serde(default)]
    pub metasploit_name: String,
    #[serde(default)]
    pub exploit_framework_canvas: bool,
    #[serde(default)]
    pub canvas_package: String,
    #[serde(default)]
    pub exploit_framework_core: bool,
    #[serde(default)]
    pub core_name: String,
}
