//! Unified project model shared by every scanner builder.
//!
//! Field names serialize in the camelCase shape the import endpoint
//! consumes. Entities are created fresh during one build and never mutated
//! after the `Project` is returned.

use serde::{Deserialize, Serialize};

/// Root of a single import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl Project {
    pub fn new(id: &str, tool: &str) -> Self {
        Self {
            id: id.to_string(),
            tool: tool.to_string(),
            ..Self::default()
        }
    }
}

/// One discovered network endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub ipv4: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub services: Vec<Service>,
}

impl Host {
    /// Empty host carrying the caller-supplied tags.
    pub fn tagged(tags: &[String]) -> Self {
        Self {
            tags: tags.to_vec(),
            ..Self::default()
        }
    }
}

/// Operating system fingerprint and the confidence the producing tool assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Os {
    pub tool: String,
    pub weight: u8,
    pub fingerprint: String,
}

/// One network service on a host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub port: u16,
    pub protocol: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub product: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// One distinct finding, deduplicated across the whole report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub title: String,
    pub cvss: f64,
    pub description: String,
    pub solution: String,
    pub evidence: String,
    #[serde(default)]
    pub cves: Vec<String>,
    #[serde(default)]
    pub plugin_ids: Vec<PluginId>,
    #[serde(default)]
    pub identified_by: Vec<IdentifiedBy>,
    pub is_flagged: bool,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub hosts: Vec<IssueHost>,
}

/// Affected (IPv4, port, protocol) reference on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueHost {
    pub ipv4: String,
    pub port: u16,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginId {
    pub tool: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedBy {
    pub tool: String,
}

/// Provenance record: which scan produced the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub tool: String,
    pub command: String,
}

impl Command {
    pub fn new(tool: &str, command: &str) -> Self {
        Self {
            tool: tool.to_string(),
            command: command.to_string(),
        }
    }
}

/// Free-text evidence attached to a service or issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    pub content: String,
    pub last_modified_by: String,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>, tool: &str) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            last_modified_by: tool.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_serializes_id_as_underscore_id() {
        let project = Project::new("p-123", "nmap");
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["_id"], "p-123");
        assert_eq!(json["tool"], "nmap");
        assert!(json["hosts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn issue_uses_camel_case_fields() {
        let issue = Issue {
            title: "SMB signing disabled".to_string(),
            cvss: 5.0,
            plugin_ids: vec![PluginId {
                tool: "nessus".to_string(),
                id: "57608".to_string(),
            }],
            is_flagged: true,
            ..Issue::default()
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["pluginIds"][0]["id"], "57608");
        assert_eq!(json["isFlagged"], true);
        assert!(json.get("identifiedBy").is_some());
    }

    #[test]
    fn host_omits_empty_optional_fields() {
        let host = Host {
            ipv4: "10.0.0.5".to_string(),
            ..Host::default()
        };
        let json = serde_json::to_value(&host).unwrap();
        assert!(json.get("mac").is_none());
        assert!(json.get("os").is_none());
        assert!(json.get("hostnames").is_none());
        assert_eq!(json["ipv4"], "10.0.0.5");
    }

    #[test]
    fn tagged_host_copies_tags() {
        let tags = vec!["dmz".to_string(), "q3".to_string()];
        let host = Host::tagged(&tags);
        assert_eq!(host.tags, tags);
        assert!(host.services.is_empty());
    }

    #[test]
    fn note_records_author() {
        let note = Note::new("http-title", "Welcome", "nmap");
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["lastModifiedBy"], "nmap");
    }
}
