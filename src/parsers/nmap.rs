//! Nmap XML (`-oX`) adapter for host/port discovery scans.
//!
//! Models only the parts of `nmaprun` the builder consumes: host state,
//! typed addresses, hostnames, port state, service identification, script
//! output, and OS match candidates.

use serde::Deserialize;

use crate::parsers::{from_xml, ReportAdapter, ReportFormat};

/// Adapter for Nmap XML output.
#[derive(Debug, Default)]
pub struct NmapAdapter;

impl ReportAdapter for NmapAdapter {
    type Tree = NmapRun;

    fn format(&self) -> ReportFormat {
        ReportFormat::Nmap
    }

    fn parse(&self, data: &[u8]) -> Result<NmapRun, anyhow::Error> {
        from_xml(data)
    }

    /// Every real `nmaprun` carries the scanner version.
    fn confirm(&self, tree: &NmapRun) -> bool {
        !tree.version.trim().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NmapRun {
    #[serde(rename = "@args", default)]
    pub args: String,
    #[serde(rename = "@version", default)]
    pub version: String,
    #[serde(rename = "host", default)]
    pub hosts: Vec<NmapHost>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NmapHost {
    #[serde(default)]
    pub status: Option<HostStatus>,
    #[serde(rename = "address", default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub hostnames: Option<Hostnames>,
    #[serde(default)]
    pub ports: Option<Ports>,
    #[serde(default)]
    pub os: Option<OsDetection>,
}

impl NmapHost {
    pub fn is_up(&self) -> bool {
        self.status.as_ref().is_some_and(|s| s.state == "up")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HostStatus {
    #[serde(rename = "@state", default)]
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Address {
    #[serde(rename = "@addr", default)]
    pub addr: String,
    #[serde(rename = "@addrtype", default)]
    pub addr_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Hostnames {
    #[serde(rename = "hostname", default)]
    pub hostnames: Vec<Hostname>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Hostname {
    #[serde(rename = "@name", default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Ports {
    #[serde(rename = "port", default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Deserialize)]
pub struct Port {
    #[serde(rename = "@protocol", default)]
    pub protocol: String,
    #[serde(rename = "@portid")]
    pub port_id: u16,
    #[serde(default)]
    pub state: Option<PortState>,
    #[serde(default)]
    pub service: Option<PortService>,
    #[serde(rename = "script", default)]
    pub scripts: Vec<Script>,
}

impl Port {
    pub fn is_open(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.state == "open")
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PortState {
    #[serde(rename = "@state", default)]
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PortService {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@product", default)]
    pub product: String,
    #[serde(rename = "@version", default)]
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Script {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "@output", default)]
    pub output: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OsDetection {
    #[serde(rename = "osmatch", default)]
    pub matches: Vec<OsMatch>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OsMatch {
    #[serde(rename = "@name", default)]
    pub name: String,
}
