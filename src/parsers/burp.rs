//! Burp Suite XML issue export adapter for web-application scans.

use serde::Deserialize;

use crate::parsers::{from_xml, ReportAdapter, ReportFormat};

/// Adapter for Burp `issues` exports.
#[derive(Debug, Default)]
pub struct BurpAdapter;

impl ReportAdapter for BurpAdapter {
    type Tree = BurpIssues;

    fn format(&self) -> ReportFormat {
        ReportFormat::Burp
    }

    fn parse(&self, data: &[u8]) -> Result<BurpIssues, anyhow::Error> {
        from_xml(data)
    }

    fn confirm(&self, tree: &BurpIssues) -> bool {
        !tree.burp_version.trim().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BurpIssues {
    #[serde(rename = "@burpVersion", default)]
    pub burp_version: String,
    #[serde(rename = "issue", default)]
    pub issues: Vec<BurpIssue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurpIssue {
    #[serde(default)]
    pub serial_number: String,
    #[serde(rename = "type", default)]
    pub issue_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: BurpHost,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub issue_background: String,
    #[serde(default)]
    pub remediation_background: String,
    #[serde(default)]
    pub issue_detail: String,
    #[serde(rename = "requestresponse", default)]
    pub request_responses: Vec<RequestResponse>,
}

/// `<host ip="...">https://example.com</host>`
#[derive(Debug, Default, Deserialize)]
pub struct BurpHost {
    #[serde(rename = "@ip", default)]
    pub ip: String,
    #[serde(rename = "$text", default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestResponse {
    #[serde(default)]
    pub request: Payload,
    #[serde(default)]
    pub response: Payload,
}

/// Raw request or response body as exported; base64 payloads are kept encoded.
#[derive(Debug, Default, Deserialize)]
pub struct Payload {
    #[serde(rename = "$text", default)]
    pub data: String,
}
