//! Business logic services.

pub mod importer;
pub mod ingestion;
