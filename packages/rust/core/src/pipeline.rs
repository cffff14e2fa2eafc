//! Discovery ingestion batch pipeline: records → reconciler → lead store.

use leadloom_reconcile::{IngestOutcome, Reconciler};
use leadloom_shared::{AppConfig, DiscoveryRecord, LeadLoomError, Result};
use leadloom_storage::Storage;
use tracing::{info, instrument, warn};

/// Summary of one ingestion batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records handed to the reconciler.
    pub processed: usize,
    /// New leads created.
    pub created: usize,
    /// Existing leads merged into.
    pub updated: usize,
    /// Malformed records skipped.
    pub skipped: usize,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each record is reconciled.
    fn record_done(&self, current: usize, total: usize);
    /// Called after each lead is enriched.
    fn lead_enriched(&self, email: &str, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn record_done(&self, _current: usize, _total: usize) {}
    fn lead_enriched(&self, _email: &str, _current: usize, _total: usize) {}
}

/// Ingest a batch of discovery records in arrival order.
///
/// Each record stands alone: a malformed record is logged and skipped and
/// the rest of the batch continues. Storage failures still abort, since
/// they mean nothing further can be persisted.
#[instrument(skip_all, fields(records = records.len()))]
pub async fn ingest_batch(
    storage: &Storage,
    config: &AppConfig,
    records: &[DiscoveryRecord],
    progress: &dyn ProgressReporter,
) -> Result<IngestSummary> {
    let reconciler = Reconciler::new(storage, config);
    let mut summary = IngestSummary::default();
    let total = records.len();

    progress.phase("Reconciling discovery records");

    for (i, record) in records.iter().enumerate() {
        match reconciler.ingest_discovery(record).await {
            Ok(IngestOutcome::Created(_)) => {
                summary.processed += 1;
                summary.created += 1;
            }
            Ok(IngestOutcome::Updated(_)) => {
                summary.processed += 1;
                summary.updated += 1;
            }
            Err(LeadLoomError::Validation { message }) => {
                warn!(
                    external_id = %record.external_id,
                    %message,
                    "skipping malformed discovery record"
                );
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        progress.record_done(i + 1, total);
    }

    info!(
        processed = summary.processed,
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        "ingestion batch complete"
    );
    Ok(summary)
}
