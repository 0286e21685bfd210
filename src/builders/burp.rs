//! Burp Suite web-application scan builder.
//!
//! Every scored finding yields its own host entry with a single service;
//! findings are not merged by address. Issues are grouped by Burp's issue
//! type, and each finding adds a request/response note to its issue.

use reqwest::Url;

use crate::builders::{HostKey, IssueTracker, ProjectBuilder};
use crate::errors::AppError;
use crate::models::{Command, Host, IdentifiedBy, Issue, Note, PluginId, Project, Service};
use crate::parsers::burp::{BurpIssue, BurpIssues};

const TOOL: &str = "burp";
const SCAN_COMMAND: &str = "Burp Scan";

/// Map Burp's severity vocabulary to a score. Zero means discard.
pub fn severity_to_cvss(severity: &str) -> f64 {
    match severity {
        "High" => 10.0,
        "Medium" => 5.0,
        "Low" => 3.0,
        _ => 0.0,
    }
}

/// Where a finding was observed.
#[derive(Debug, PartialEq)]
pub struct Target {
    pub hostname: String,
    pub port: u16,
    pub scheme: String,
}

/// Parse a finding's target URL, deriving the port from the scheme when the
/// URL does not carry one.
pub fn parse_target(target: &str) -> Result<Target, AppError> {
    let url = Url::parse(target)
        .map_err(|e| AppError::Build(format!("invalid target URL '{target}': {e}")))?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::Build(format!("target URL '{target}' has no host")))?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string();

    let port = match (url.port(), url.scheme()) {
        (Some(port), _) => port,
        // The URL parser drops a written port equal to the scheme default.
        (None, _) if authority_has_port(target) => match url.port_or_known_default() {
            Some(port) => port,
            None => {
                return Err(AppError::Build(format!(
                    "cannot read port in '{target}'"
                )))
            }
        },
        (None, "http") => 80,
        (None, "https") => 443,
        (None, scheme) => {
            return Err(AppError::Build(format!(
                "cannot derive port for scheme '{scheme}' in '{target}'"
            )))
        }
    };

    Ok(Target {
        hostname: host,
        port,
        scheme: url.scheme().to_string(),
    })
}

/// Whether the authority of `target` spells out a `:port`.
fn authority_has_port(target: &str) -> bool {
    let rest = target.split_once("://").map_or("", |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let after_host = match host_port.rfind(']') {
        Some(i) => &host_port[i + 1..],
        None => host_port,
    };
    after_host
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
}

impl ProjectBuilder for BurpIssues {
    fn tool(&self) -> &'static str {
        TOOL
    }

    fn build(&self, project_id: &str, tags: &[String]) -> Result<Project, AppError> {
        let mut project = Project::new(project_id, self.tool());
        let mut tracker = IssueTracker::new();

        for issue in &self.issues {
            let cvss = severity_to_cvss(&issue.severity);
            if cvss == 0.0 {
                tracing::trace!(serial = %issue.serial_number, "Skipping informational finding");
                continue;
            }

            let target = parse_target(&issue.host.name)?;

            tracker.insert_if_absent(&issue.issue_type, || new_issue(issue, cvss));
            if let Some(tracked) = tracker.get_mut(&issue.issue_type) {
                tracked.notes.push(exchange_note(issue));
            }
            tracker.add_host(
                &issue.issue_type,
                HostKey::new(&issue.host.ip, target.port, "tcp"),
            );

            let mut host = Host::tagged(tags);
            host.ipv4 = issue.host.ip.clone();
            host.hostnames.push(target.hostname);
            host.services.push(Service {
                port: target.port,
                protocol: "tcp".to_string(),
                service: target.scheme,
                ..Service::default()
            });
            project.hosts.push(host);
        }

        project.issues = tracker.into_issues();
        project.commands.push(Command::new(TOOL, SCAN_COMMAND));

        tracing::debug!(
            project_id,
            hosts = project.hosts.len(),
            issues = project.issues.len(),
            "Built burp project"
        );
        Ok(project)
    }
}

fn new_issue(issue: &BurpIssue, cvss: f64) -> Issue {
    Issue {
        title: issue.name.clone(),
        cvss,
        description: issue.issue_background.clone(),
        solution: issue.remediation_background.clone(),
        evidence: issue.issue_detail.clone(),
        plugin_ids: vec![PluginId {
            tool: TOOL.to_string(),
            id: issue.issue_type.clone(),
        }],
        identified_by: vec![IdentifiedBy {
            tool: TOOL.to_string(),
        }],
        ..Issue::default()
    }
}

/// Note holding the last recorded request/response pair of a finding.
fn exchange_note(issue: &BurpIssue) -> Note {
    let title = format!(
        "{}{} {}",
        issue.host.name, issue.path, issue.serial_number
    );
    let content = issue
        .request_responses
        .last()
        .map(|rr| {
            format!(
                "Request:\n{}\nResponse:\n{}",
                rr.request.data, rr.response.data
            )
        })
        .unwrap_or_default();
    Note::new(title, content, TOOL)
}
