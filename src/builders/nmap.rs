//! Nmap host/port discovery builder. Produces hosts and services only.

use crate::builders::ProjectBuilder;
use crate::errors::AppError;
use crate::models::{Command, Host, Note, Os, Project, Service};
use crate::parsers::nmap::{NmapHost, NmapRun, Port};

const TOOL: &str = "nmap";

/// OS detection from nmap is weighted below plugin-based detection.
const OS_WEIGHT: u8 = 50;

impl ProjectBuilder for NmapRun {
    fn tool(&self) -> &'static str {
        TOOL
    }

    fn build(&self, project_id: &str, tags: &[String]) -> Result<Project, AppError> {
        let mut project = Project::new(project_id, self.tool());
        project.commands.push(Command::new(TOOL, &self.args));

        for h in self.hosts.iter().filter(|h| h.is_up()) {
            project.hosts.push(build_host(h, tags));
        }

        tracing::debug!(
            project_id,
            hosts = project.hosts.len(),
            "Built nmap project"
        );
        Ok(project)
    }
}

fn build_host(h: &NmapHost, tags: &[String]) -> Host {
    let mut host = Host::tagged(tags);

    for address in &h.addresses {
        match address.addr_type.as_str() {
            "ipv4" if host.ipv4.is_empty() => host.ipv4 = address.addr.clone(),
            "mac" if host.mac.is_none() => host.mac = Some(address.addr.clone()),
            _ => {}
        }
    }

    if let Some(hostnames) = &h.hostnames {
        host.hostnames = hostnames.hostnames.iter().map(|n| n.name.clone()).collect();
    }

    if let Some(ports) = &h.ports {
        for p in ports.ports.iter().filter(|p| p.is_open()) {
            add_service(&mut host.services, build_service(p));
        }
    }

    if let Some(best) = h.os.as_ref().and_then(|os| os.matches.first()) {
        host.os = Some(Os {
            tool: TOOL.to_string(),
            weight: OS_WEIGHT,
            fingerprint: best.name.clone(),
        });
    }

    host
}

fn build_service(p: &Port) -> Service {
    let mut service = Service {
        port: p.port_id,
        protocol: p.protocol.clone(),
        ..Service::default()
    };

    if let Some(svc) = p.service.as_ref().filter(|s| !s.name.is_empty()) {
        service.service = svc.name.clone();
        service.product = product_string(&svc.product, &svc.version);
    }

    service.notes = p
        .scripts
        .iter()
        .map(|script| Note::new(script.id.as_str(), script.output.as_str(), TOOL))
        .collect();

    service
}

/// "product version", "product", or "Unknown" when nothing was fingerprinted.
fn product_string(product: &str, version: &str) -> String {
    match (product.is_empty(), version.is_empty()) {
        (true, _) => "Unknown".to_string(),
        (false, true) => product.to_string(),
        (false, false) => format!("{product} {version}"),
    }
}

/// Merge into an existing (port, protocol) entry rather than duplicating it.
fn add_service(services: &mut Vec<Service>, service: Service) {
    match services
        .iter_mut()
        .find(|s| s.port == service.port && s.protocol == service.protocol)
    {
        Some(existing) => existing.notes.extend(service.notes),
        None => services.push(service),
    }
}
