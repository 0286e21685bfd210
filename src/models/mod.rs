//! Unified data model produced by the builders and consumed by the importer.

pub mod project;

pub use project::{
    Command, Host, IdentifiedBy, Issue, IssueHost, Note, Os, PluginId, Project, Service,
};
