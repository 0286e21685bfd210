//! Builders converting parsed scanner trees into the unified project model.
//!
//! Each parsed tree implements `ProjectBuilder`; callers hold a
//! `ParsedReport` from the detector and never touch format-specific types.
//! Issues are deduplicated across a report by a per-format identity key and
//! their affected hosts by `HostKey`.

pub mod burp;
pub mod nessus;
pub mod nmap;

use std::collections::{BTreeSet, HashMap};

use crate::errors::AppError;
use crate::models::{Issue, IssueHost, Project};
use crate::parsers::ParsedReport;

/// Capability shared by every per-format builder.
pub trait ProjectBuilder {
    /// Tool name recorded on the project, its commands, and its notes.
    fn tool(&self) -> &'static str;

    /// Build a unified project. The whole build fails on the first
    /// structural error; no partial project is returned.
    fn build(&self, project_id: &str, tags: &[String]) -> Result<Project, AppError>;
}

impl ProjectBuilder for ParsedReport {
    fn tool(&self) -> &'static str {
        match self {
            Self::Nmap(run) => run.tool(),
            Self::Nessus(data) => data.tool(),
            Self::Burp(issues) => issues.tool(),
        }
    }

    fn build(&self, project_id: &str, tags: &[String]) -> Result<Project, AppError> {
        match self {
            Self::Nmap(run) => run.build(project_id, tags),
            Self::Nessus(data) => data.build(project_id, tags),
            Self::Burp(issues) => issues.build(project_id, tags),
        }
    }
}

/// An (IPv4, port, protocol) triple identifying where an issue was seen.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostKey {
    pub ipv4: String,
    pub port: u16,
    pub protocol: String,
}

impl HostKey {
    pub fn new(ipv4: &str, port: u16, protocol: &str) -> Self {
        Self {
            ipv4: ipv4.to_string(),
            port,
            protocol: protocol.to_string(),
        }
    }
}

impl From<HostKey> for IssueHost {
    fn from(key: HostKey) -> Self {
        Self {
            ipv4: key.ipv4,
            port: key.port,
            protocol: key.protocol,
        }
    }
}

/// Accumulates issues keyed by a per-format identity, in first-seen order.
///
/// The first issue registered under a key keeps its descriptive fields;
/// later occurrences only contribute affected hosts and notes.
#[derive(Debug, Default)]
pub struct IssueTracker {
    index: HashMap<String, usize>,
    entries: Vec<(Issue, BTreeSet<HostKey>)>,
}

impl IssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Register an issue under `key` unless one already exists.
    pub fn insert_if_absent(&mut self, key: &str, make: impl FnOnce() -> Issue) {
        if self.contains(key) {
            return;
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push((make(), BTreeSet::new()));
    }

    /// Mutable access to a tracked issue.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Issue> {
        let slot = *self.index.get(key)?;
        Some(&mut self.entries[slot].0)
    }

    /// Record an affected host; duplicates collapse.
    pub fn add_host(&mut self, key: &str, host: HostKey) {
        if let Some(&slot) = self.index.get(key) {
            self.entries[slot].1.insert(host);
        }
    }

    /// Flatten every host set onto its issue, in first-seen issue order.
    pub fn into_issues(self) -> Vec<Issue> {
        self.entries
            .into_iter()
            .map(|(mut issue, hosts)| {
                issue.hosts = hosts.into_iter().map(IssueHost::from).collect();
                issue
            })
            .collect()
    }
}
