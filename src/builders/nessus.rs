//! Nessus vulnerability-scan builder.
//!
//! Walks every `ReportItem` of every host once. Each surviving item
//! contributes a service (deduplicated per host by port and protocol),
//! optionally an evidence note on that service, and, when it scores above
//! zero, an affected-host entry on the issue keyed by its plugin ID. Plugin
//! 19506 carries the scan's own command line instead of a vulnerability.

use regex::Regex;

use crate::builders::{HostKey, IssueTracker, ProjectBuilder};
use crate::errors::AppError;
use crate::models::{Command, Host, IdentifiedBy, Issue, Note, Os, PluginId, Project, Service};
use crate::parsers::nessus::{NessusData, ReportHost, ReportItem};

const TOOL: &str = "nessus";

/// Credentialed/plugin-based OS detection outranks nmap's guess.
const OS_WEIGHT: u8 = 75;

/// "Nessus Scan Information": its output is the scanner invocation.
const SCAN_INFO_PLUGIN: &str = "19506";

const UNKNOWN_COMMAND: &str = "Nessus scan - command unknown";
const EXPLOIT_UNKNOWN: &str = "Exploit exists. Details unknown.";

/// Housekeeping families whose output is not worth a note.
const NOISY_FAMILIES: [&str; 2] = ["Port scanners", "Service detection"];

fn cve_pattern() -> Result<Regex, AppError> {
    Regex::new(r"^(CVE-|CAN-)").map_err(|e| AppError::Internal(format!("CVE pattern: {e}")))
}

/// Strip a leading `CVE-` or `CAN-` marker. Idempotent.
pub fn normalize_cve(pattern: &Regex, cve: &str) -> String {
    pattern.replace(cve.trim(), "").into_owned()
}

/// Resolve an item's score: explicit base score first, then the textual
/// risk factor. Zero means informational.
pub fn resolve_cvss(base_score: Option<f64>, risk_factor: &str) -> f64 {
    match base_score {
        Some(score) if score != 0.0 => score,
        _ => match risk_factor {
            "Critical" => 10.0,
            "High" => 7.5,
            "Medium" => 5.0,
            _ => 0.0,
        },
    }
}

/// Trim each evidence line and re-indent it by four spaces.
pub fn format_evidence(evidence: &str) -> String {
    evidence
        .lines()
        .map(|line| line.trim_matches([' ', '\t', '\r']))
        .filter(|line| !line.is_empty())
        .map(|line| format!("    {line}\n"))
        .collect()
}

/// UDP services the scanner could not confirm are suffixed with `?`.
fn is_unconfirmed_udp(item: &ReportItem) -> bool {
    item.protocol == "udp" && item.service_name.ends_with('?')
}

fn wants_note(item: &ReportItem) -> bool {
    !item.plugin_output.is_empty()
        && item.severity >= 1
        && !NOISY_FAMILIES.contains(&item.plugin_family.as_str())
}

/// Mutable state threaded through one build.
struct NessusWalk {
    cve_pattern: Regex,
    tracker: IssueTracker,
    command: Option<Command>,
    next_note_id: u32,
}

impl ProjectBuilder for NessusData {
    fn tool(&self) -> &'static str {
        TOOL
    }

    fn build(&self, project_id: &str, tags: &[String]) -> Result<Project, AppError> {
        let mut project = Project::new(project_id, self.tool());
        let mut walk = NessusWalk {
            cve_pattern: cve_pattern()?,
            tracker: IssueTracker::new(),
            command: None,
            next_note_id: 1,
        };

        for report_host in &self.report.hosts {
            let host = walk.host(report_host, tags);
            project.hosts.push(host);
        }

        project.issues = walk.tracker.into_issues();
        project.commands.push(
            walk.command
                .unwrap_or_else(|| Command::new(TOOL, UNKNOWN_COMMAND)),
        );

        tracing::debug!(
            project_id,
            hosts = project.hosts.len(),
            issues = project.issues.len(),
            "Built nessus project"
        );
        Ok(project)
    }
}

impl NessusWalk {
    fn host(&mut self, report_host: &ReportHost, tags: &[String]) -> Host {
        let mut host = Host::tagged(tags);

        for tag in &report_host.properties.tags {
            match tag.name.as_str() {
                "operating-system" => {
                    host.os = Some(Os {
                        tool: TOOL.to_string(),
                        weight: OS_WEIGHT,
                        fingerprint: tag.value.clone(),
                    })
                }
                "host-ip" => host.ipv4 = tag.value.clone(),
                "mac-address" => host.mac = Some(tag.value.clone()),
                "host-fqdn" | "netbios-name" => host.hostnames.push(tag.value.clone()),
                _ => {}
            }
        }

        // Fall back to the ReportHost name before any issue references the host.
        if host.ipv4.is_empty() {
            host.ipv4 = report_host.name.clone();
        }

        for item in &report_host.items {
            if is_unconfirmed_udp(item) {
                tracing::trace!(
                    plugin_id = %item.plugin_id,
                    port = item.port,
                    "Skipping unconfirmed UDP finding"
                );
                continue;
            }
            self.item(&mut host, item);
        }

        host
    }

    fn item(&mut self, host: &mut Host, item: &ReportItem) {
        let slot = service_slot(&mut host.services, item);

        if wants_note(item) {
            let title = format!("{} (ID{})", item.plugin_name, self.next_note_id);
            self.next_note_id += 1;
            host.services[slot]
                .notes
                .push(Note::new(title, format_evidence(&item.plugin_output), TOOL));
        }

        if item.plugin_id == SCAN_INFO_PLUGIN {
            if self.command.is_none() {
                self.command = Some(Command::new(TOOL, &item.plugin_output));
            }
            return;
        }

        if !self.tracker.contains(&item.plugin_id) {
            let cvss = resolve_cvss(item.cvss_base_score, &item.risk_factor);
            if cvss == 0.0 {
                tracing::trace!(plugin_id = %item.plugin_id, "Skipping informational finding");
                return;
            }
            let pattern = &self.cve_pattern;
            self.tracker
                .insert_if_absent(&item.plugin_id, || new_issue(item, cvss, pattern));
        }

        self.tracker.add_host(
            &item.plugin_id,
            HostKey::new(&host.ipv4, item.port, &item.protocol),
        );
    }
}

/// Index of the (port, protocol) service on this host, creating it if needed.
fn service_slot(services: &mut Vec<Service>, item: &ReportItem) -> usize {
    if let Some(i) = services
        .iter()
        .position(|s| s.port == item.port && s.protocol == item.protocol)
    {
        return i;
    }
    services.push(Service {
        port: item.port,
        protocol: item.protocol.clone(),
        service: item.service_name.clone(),
        ..Service::default()
    });
    services.len() - 1
}

fn new_issue(item: &ReportItem, cvss: f64, cve_pattern: &Regex) -> Issue {
    Issue {
        title: item.plugin_name.clone(),
        cvss,
        description: item.description.clone(),
        solution: item.solution.clone(),
        evidence: item.plugin_output.clone(),
        cves: item
            .cves
            .iter()
            .map(|c| normalize_cve(cve_pattern, c))
            .collect(),
        plugin_ids: vec![PluginId {
            tool: TOOL.to_string(),
            id: item.plugin_id.clone(),
        }],
        identified_by: vec![IdentifiedBy {
            tool: TOOL.to_string(),
        }],
        is_flagged: item.exploit_available,
        notes: exploit_notes(item),
        hosts: Vec::new(),
    }
}

/// One note per exploit framework the item names.
fn exploit_notes(item: &ReportItem) -> Vec<Note> {
    if !item.exploit_available {
        return Vec::new();
    }
    [
        (
            item.exploit_framework_metasploit,
            "Metasploit Exploit",
            &item.metasploit_name,
        ),
        (
            item.exploit_framework_canvas,
            "Canvas Exploit",
            &item.canvas_package,
        ),
        (
            item.exploit_framework_core,
            "Core Impact Exploit",
            &item.core_name,
        ),
    ]
    .into_iter()
    .filter(|(present, _, _)| *present)
    .map(|(_, title, detail)| {
        let content = if detail.is_empty() {
            EXPLOIT_UNKNOWN
        } else {
            detail.as_str()
        };
        Note::new(title, content, TOOL)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueHost;
    use crate::parsers::nessus::NessusAdapter;
    use crate::parsers::ReportAdapter;

    const SAMPLE: &[u8] = include_bytes!("../../tests/fixtures/nessus_sample.nessus");

    fn build_sample() -> Project {
        build(SAMPLE)
    }

    fn build(data: &[u8]) -> Project {
        NessusAdapter
            .parse(data)
            .unwrap()
            .build("proj-9", &["internal".to_string()])
            .unwrap()
    }

    fn issue<'a>(project: &'a Project, plugin_id: &str) -> Option<&'a Issue> {
        project
            .issues
            .iter()
            .find(|i| i.plugin_ids.iter().any(|p| p.id == plugin_id))
    }

    fn wrap(items: &str) -> Vec<u8> {
        format!(
            r#"<NessusClientData_v2><Report name="r"><ReportHost name="10.1.1.1"><HostProperties><tag name="host-ip">10.1.1.1</tag></HostProperties>{items}</ReportHost></Report></NessusClientData_v2>"#
        )
        .into_bytes()
    }

    #[test]
    fn first_scan_info_command_wins() {
        let project = build_sample();
        assert_eq!(project.commands.len(), 1);
        assert_eq!(project.commands[0].tool, "nessus");
        assert_eq!(project.commands[0].command, "Command line : nessus -q -x scan X");
        assert!(issue(&project, "19506").is_none());
    }

    #[test]
    fn placeholder_command_without_scan_info() {
        let project = build(&wrap(
            r#"<ReportItem port="80" svc_name="www" protocol="tcp" severity="2" pluginID="1" pluginName="p"><risk_factor>Medium</risk_factor></ReportItem>"#,
        ));
        assert_eq!(project.commands.len(), 1);
        assert_eq!(project.commands[0].command, "Nessus scan - command unknown");
    }

    #[test]
    fn risk_factor_critical_scores_ten() {
        let project = build_sample();
        let rdp = issue(&project, "10000").unwrap();
        assert_eq!(rdp.cvss, 10.0);
    }

    #[test]
    fn informational_findings_create_no_issue() {
        let project = build_sample();
        assert!(issue(&project, "11011").is_none());
        assert!(issue(&project, "20000").is_none());
        assert!(issue(&project, "22964").is_none());
        assert_eq!(project.issues.len(), 3);
    }

    #[test]
    fn unconfirmed_udp_finding_is_dropped() {
        let project = build_sample();
        assert!(issue(&project, "41028").is_none());
        let host = &project.hosts[0];
        assert!(host.services.iter().all(|s| s.port != 161));
    }

    #[test]
    fn confirmed_udp_finding_is_kept() {
        let project = build(&wrap(
            r#"<ReportItem port="161" svc_name="snmp" protocol="udp" severity="2" pluginID="41028" pluginName="SNMP"><cvss_base_score>5.0</cvss_base_score></ReportItem>"#,
        ));
        assert_eq!(project.hosts[0].services[0].port, 161);
        assert_eq!(project.issues.len(), 1);
    }

    #[test]
    fn issue_hosts_are_deduplicated_union() {
        let project = build_sample();
        let ms17 = issue(&project, "97833").unwrap();
        assert_eq!(
            ms17.hosts,
            vec![
                IssueHost {
                    ipv4: "192.168.1.10".into(),
                    port: 445,
                    protocol: "tcp".into()
                },
                IssueHost {
                    ipv4: "192.168.1.11".into(),
                    port: 445,
                    protocol: "tcp".into()
                },
            ]
        );
    }

    #[test]
    fn first_occurrence_keeps_descriptive_fields() {
        let project = build_sample();
        let ms17 = issue(&project, "97833").unwrap();
        assert_eq!(
            ms17.title,
            "MS17-010: Security Update for Microsoft Windows SMB Server"
        );
        assert_eq!(ms17.solution, "Apply the MS17-010 update.");
        assert!(ms17.evidence.contains("Details: SMBv1 enabled"));
    }

    #[test]
    fn cves_are_normalized() {
        let project = build_sample();
        assert_eq!(issue(&project, "97833").unwrap().cves, vec!["2017-0143", "2017-0144"]);
        assert_eq!(issue(&project, "70658").unwrap().cves, vec!["2008-5161"]);
    }

    #[test]
    fn normalize_cve_is_idempotent() {
        let pattern = cve_pattern().unwrap();
        for raw in ["CVE-2017-0143", "CAN-2008-5161", "2020-1234"] {
            let once = normalize_cve(&pattern, raw);
            assert_eq!(normalize_cve(&pattern, &once), once);
        }
        assert_eq!(normalize_cve(&pattern, "CVE-2017-0143"), "2017-0143");
    }

    #[test]
    fn exploit_notes_per_framework() {
        let project = build_sample();
        let ms17 = issue(&project, "97833").unwrap();
        assert!(ms17.is_flagged);
        assert_eq!(ms17.notes.len(), 1);
        assert_eq!(ms17.notes[0].title, "Metasploit Exploit");
        assert_eq!(
            ms17.notes[0].content,
            "MS17-010 EternalBlue SMB Remote Windows Kernel Pool Corruption"
        );

        let rdp = issue(&project, "10000").unwrap();
        let notes: Vec<_> = rdp
            .notes
            .iter()
            .map(|n| (n.title.as_str(), n.content.as_str()))
            .collect();
        assert_eq!(
            notes,
            vec![
                ("Canvas Exploit", "Exploit exists. Details unknown."),
                ("Core Impact Exploit", "Core RDP Remote Exploit"),
            ]
        );
    }

    #[test]
    fn host_properties_extracted() {
        let project = build_sample();
        let host = &project.hosts[0];
        assert_eq!(host.ipv4, "192.168.1.10");
        assert_eq!(host.mac.as_deref(), Some("00:50:56:aa:bb:cc"));
        assert_eq!(host.hostnames, vec!["fileserver.corp.local", "FILESERVER"]);
        let os = host.os.as_ref().unwrap();
        assert_eq!(os.weight, 75);
        assert_eq!(os.fingerprint, "Microsoft Windows Server 2016 Standard");
        assert_eq!(host.tags, vec!["internal"]);
    }

    #[test]
    fn ipv4_falls_back_to_report_host_name() {
        let project = build_sample();
        assert_eq!(project.hosts[1].ipv4, "192.168.1.11");
        assert!(project.hosts[1].mac.is_none());
    }

    #[test]
    fn services_deduplicated_per_host() {
        let project = build_sample();
        let ports: Vec<(u16, &str)> = project.hosts[0]
            .services
            .iter()
            .map(|s| (s.port, s.protocol.as_str()))
            .collect();
        assert_eq!(ports, vec![(0, "tcp"), (445, "tcp"), (3389, "tcp"), (80, "tcp")]);

        let backup = &project.hosts[1].services;
        let smb = backup.iter().find(|s| s.port == 445).unwrap();
        assert_eq!(smb.notes.len(), 2);
        assert!(smb.notes[0].title.ends_with("(ID4)"));
        assert!(smb.notes[1].title.ends_with("(ID5)"));
    }

    #[test]
    fn evidence_notes_skip_noise_and_informational() {
        let project = build_sample();
        let host = &project.hosts[0];
        let smb = host.services.iter().find(|s| s.port == 445).unwrap();
        assert_eq!(smb.notes.len(), 1);
        assert_eq!(
            smb.notes[0].title,
            "MS17-010: Security Update for Microsoft Windows SMB Server (ID1)"
        );
        assert_eq!(
            smb.notes[0].content,
            "    Host is vulnerable.\n    Details: SMBv1 enabled\n"
        );

        let general = host.services.iter().find(|s| s.port == 0).unwrap();
        assert!(general.notes.is_empty());

        // Low severity still yields a note even though no issue is created.
        let web = host.services.iter().find(|s| s.port == 80).unwrap();
        assert_eq!(web.notes[0].title, "Web Server Banner Disclosure (ID3)");

        let ssh = project.hosts[1].services.iter().find(|s| s.port == 22).unwrap();
        assert_eq!(ssh.notes.len(), 1);
        assert_eq!(ssh.notes[0].title, "SSH Server CBC Mode Ciphers Enabled (ID6)");
    }

    #[test]
    fn explicit_base_score_preferred() {
        let project = build_sample();
        assert_eq!(issue(&project, "70658").unwrap().cvss, 2.6);
    }

    #[test]
    fn issue_hosts_match_host_services() {
        let project = build_sample();
        for issue in &project.issues {
            for ih in &issue.hosts {
                let matched = project.hosts.iter().any(|h| {
                    h.ipv4 == ih.ipv4
                        && h.services
                            .iter()
                            .any(|s| s.port == ih.port && s.protocol == ih.protocol)
                });
                assert!(matched, "dangling issue host {ih:?}");
            }
        }
    }

    #[test]
    fn resolve_cvss_policy() {
        assert_eq!(resolve_cvss(Some(6.8), "Low"), 6.8);
        assert_eq!(resolve_cvss(None, "Critical"), 10.0);
        assert_eq!(resolve_cvss(None, "High"), 7.5);
        assert_eq!(resolve_cvss(Some(0.0), "Medium"), 5.0);
        assert_eq!(resolve_cvss(None, "Low"), 0.0);
        assert_eq!(resolve_cvss(None, "None"), 0.0);
        assert_eq!(resolve_cvss(None, ""), 0.0);
    }

    #[test]
    fn format_evidence_trims_and_indents() {
        assert_eq!(format_evidence("  a \n\n\tb\t\n"), "    a\n    b\n");
        assert_eq!(format_evidence(""), "");
    }
}
