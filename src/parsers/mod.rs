//! Scanner report adapters and format detection.
//!
//! Each adapter implements the `ReportAdapter` trait, deserializing raw
//! bytes into a format-specific tree and confirming that the tree really
//! belongs to its format. The XML deserializer is permissive: a document
//! from one scanner usually "parses" under another scanner's schema with
//! every field defaulted, so the confirmation check is what separates a
//! match from a cosmetic false positive.

pub mod burp;
pub mod nessus;
pub mod nmap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AppError;

/// Tag identifying which adapter matched an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Nmap,
    Nessus,
    Burp,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nmap => write!(f, "nmap"),
            Self::Nessus => write!(f, "nessus"),
            Self::Burp => write!(f, "burp"),
        }
    }
}

/// Trait for pluggable scanner report adapters.
pub trait ReportAdapter {
    /// The parsed tree this adapter produces.
    type Tree;

    /// The format this adapter recognises.
    fn format(&self) -> ReportFormat;

    /// Parse raw bytes into the adapter's tree.
    fn parse(&self, data: &[u8]) -> Result<Self::Tree, anyhow::Error>;

    /// Whether a successfully parsed tree actually belongs to this format.
    fn confirm(&self, tree: &Self::Tree) -> bool;
}

/// A confirmed parse, tagged by the format that matched.
#[derive(Debug)]
pub enum ParsedReport {
    Nmap(nmap::NmapRun),
    Nessus(nessus::NessusData),
    Burp(burp::BurpIssues),
}

impl ParsedReport {
    pub fn format(&self) -> ReportFormat {
        match self {
            Self::Nmap(_) => ReportFormat::Nmap,
            Self::Nessus(_) => ReportFormat::Nessus,
            Self::Burp(_) => ReportFormat::Burp,
        }
    }
}

/// Detect the report format by trying each adapter in priority order:
/// nmap, then nessus, then burp.
///
/// Parse errors and failed confirmations fall through to the next adapter;
/// only exhausting all three is an error.
pub fn detect(data: &[u8]) -> Result<ParsedReport, AppError> {
    if let Some(tree) = try_adapter(&nmap::NmapAdapter, data) {
        return Ok(ParsedReport::Nmap(tree));
    }
    if let Some(tree) = try_adapter(&nessus::NessusAdapter, data) {
        return Ok(ParsedReport::Nessus(tree));
    }
    if let Some(tree) = try_adapter(&burp::BurpAdapter, data) {
        return Ok(ParsedReport::Burp(tree));
    }
    Err(AppError::UnrecognizedFormat)
}

fn try_adapter<A: ReportAdapter>(adapter: &A, data: &[u8]) -> Option<A::Tree> {
    match adapter.parse(data) {
        Ok(tree) if adapter.confirm(&tree) => Some(tree),
        Ok(_) => {
            tracing::debug!(format = %adapter.format(), "Parsed but failed format confirmation");
            None
        }
        Err(e) => {
            tracing::debug!(format = %adapter.format(), error = %e, "Adapter parse failed");
            None
        }
    }
}

/// Deserialize an XML document with quick-xml's serde support.
pub(crate) fn from_xml<T: DeserializeOwned>(data: &[u8]) -> Result<T, anyhow::Error> {
    let text = std::str::from_utf8(data)?;
    let text = text.trim_start_matches('\u{feff}');
    Ok(quick_xml::de::from_str(text)?)
}
