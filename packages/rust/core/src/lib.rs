//! End-to-end workflows for leadloom.
//!
//! Ties discovery ingestion, reconciliation, storage and the enrichment
//! collaborator into the two operational pipelines the CLI drives.

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{EnrichmentSummary, quota_day, run_enrichment};
pub use pipeline::{IngestSummary, ProgressReporter, SilentProgress, ingest_batch};
