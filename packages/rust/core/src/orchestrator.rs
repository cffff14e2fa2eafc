//! Enrichment orchestrator: pending leads → collaborator → reconciler.
//!
//! Walks leads still waiting for a real email, oldest first, calling the
//! email-finder collaborator for each. The shared daily quota counter is
//! consumed atomically before every call, so overlapping runs on the same
//! database never overshoot the collaborator's daily limit.

use chrono::{DateTime, Duration, Utc};
use leadloom_enrich::EmailFinder;
use leadloom_reconcile::Reconciler;
use leadloom_shared::{AppConfig, Result};
use leadloom_storage::Storage;
use tracing::{info, instrument, warn};

use crate::pipeline::ProgressReporter;

/// Summary of one enrichment run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentSummary {
    /// Leads for which a collaborator call was made.
    pub processed: usize,
    /// Leads whose email was updated.
    pub enriched: usize,
    /// Leads where no usable email was found or the policy refused.
    pub skipped: usize,
    /// Leads where the collaborator call failed.
    pub failed: usize,
    /// Leads left untouched because the daily quota ran out.
    pub deferred: usize,
}

/// Quota day key for `now`, respecting the configured UTC reset hour.
///
/// With a reset hour of 6, the day rolls over at 06:00 UTC instead of
/// midnight, so 03:00 UTC still counts against the previous day's quota.
pub fn quota_day(now: DateTime<Utc>, reset_hour_utc: u8) -> String {
    (now - Duration::hours(i64::from(reset_hour_utc)))
        .format("%Y-%m-%d")
        .to_string()
}

/// Run one enrichment pass over at most `limit` pending leads.
///
/// Stops cleanly when the daily quota is exhausted, counting every lead not
/// yet attempted as deferred. A collaborator failure on one lead is logged
/// and counted; the run continues with the next lead.
#[instrument(skip_all, fields(limit = limit))]
pub async fn run_enrichment<F: EmailFinder>(
    storage: &Storage,
    config: &AppConfig,
    finder: &F,
    limit: u32,
    progress: &dyn ProgressReporter,
) -> Result<EnrichmentSummary> {
    let reconciler = Reconciler::new(storage, config);
    let mut summary = EnrichmentSummary::default();

    progress.phase("Enriching pending leads");
    let pending = storage.list_pending_enrichment(limit).await?;
    let total = pending.len();
    info!(pending = total, "starting enrichment run");

    for (i, lead) in pending.iter().enumerate() {
        let day = quota_day(Utc::now(), config.enrichment.quota_reset_hour_utc);
        if !storage
            .try_consume_quota(&day, config.enrichment.daily_quota)
            .await?
        {
            summary.deferred = total - i;
            info!(deferred = summary.deferred, %day, "daily quota exhausted");
            break;
        }

        summary.processed += 1;
        let Some(domain) = lead.domain.as_deref() else {
            // The pending query requires a domain; guard anyway.
            summary.skipped += 1;
            continue;
        };

        match finder.find_email(domain).await {
            Ok(Some(result)) => match reconciler.ingest_enrichment(&lead.id, &result).await {
                Ok(true) => {
                    summary.enriched += 1;
                    progress.lead_enriched(&result.email, i + 1, total);
                }
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    warn!(lead_id = %lead.id, error = %e, "failed to apply enrichment");
                    summary.failed += 1;
                }
            },
            Ok(None) => summary.skipped += 1,
            Err(e) => {
                warn!(lead_id = %lead.id, %domain, error = %e, "collaborator call failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        processed = summary.processed,
        enriched = summary.enriched,
        skipped = summary.skipped,
        failed = summary.failed,
        deferred = summary.deferred,
        "enrichment run complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{SilentProgress, ingest_batch};
    use chrono::TimeZone;
    use leadloom_shared::{
        DiscoveryRecord, EnrichmentResult, LeadLoomError, LeadSource, QualificationLevel,
    };
    use uuid::Uuid;

    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("ll_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn record(external_id: &str, name: &str, text: &str) -> DiscoveryRecord {
        DiscoveryRecord {
            source: LeadSource::YoutubeCreatorScraper,
            external_id: external_id.into(),
            display_name: name.into(),
            raw_text: text.into(),
            candidate_domains: vec![],
            niche_hint: None,
        }
    }

    /// Always finds the same-pattern email for any domain.
    struct FakeFinder {
        confidence: u8,
        verified: bool,
    }

    impl EmailFinder for FakeFinder {
        async fn find_email(&self, domain: &str) -> Result<Option<EnrichmentResult>> {
            Ok(Some(EnrichmentResult {
                email: format!("contact@{domain}"),
                confidence: self.confidence,
                verified: self.verified,
                domain: domain.to_string(),
            }))
        }
    }

    /// Never finds anything.
    struct EmptyFinder;

    impl EmailFinder for EmptyFinder {
        async fn find_email(&self, _domain: &str) -> Result<Option<EnrichmentResult>> {
            Ok(None)
        }
    }

    /// Always fails.
    struct BrokenFinder;

    impl EmailFinder for BrokenFinder {
        async fn find_email(&self, domain: &str) -> Result<Option<EnrichmentResult>> {
            Err(LeadLoomError::Network(format!("{domain}: connection reset")))
        }
    }

    #[test]
    fn quota_day_respects_reset_hour() {
        let three_am = Utc.with_ymd_and_hms(2026, 8, 25, 3, 0, 0).unwrap();
        assert_eq!(quota_day(three_am, 0), "2026-08-25");
        // Before the 06:00 reset the previous day's quota still applies.
        assert_eq!(quota_day(three_am, 6), "2026-08-24");

        let noon = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        assert_eq!(quota_day(noon, 6), "2026-08-25");
    }

    #[tokio::test]
    async fn quota_stops_the_run_and_defers_the_rest() {
        let storage = test_storage().await;
        let mut config = AppConfig::default();
        config.enrichment.daily_quota = 2;

        let records: Vec<_> = (1..=5)
            .map(|i| record(&format!("UC{i}"), &format!("Creator {i}"), &format!("site{i}.com")))
            .collect();
        ingest_batch(&storage, &config, &records, &SilentProgress)
            .await
            .unwrap();

        let finder = FakeFinder {
            confidence: 90,
            verified: true,
        };
        let summary = run_enrichment(&storage, &config, &finder, 100, &SilentProgress)
            .await
            .expect("run");

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.enriched, 2);
        assert_eq!(summary.deferred, 3);
        assert_eq!(summary.failed, 0);

        // A second run the same day gets nothing through the quota.
        let summary = run_enrichment(&storage, &config, &finder, 100, &SilentProgress)
            .await
            .expect("second run");
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.deferred, 3);
    }

    #[tokio::test]
    async fn collaborator_failures_are_counted_not_fatal() {
        let storage = test_storage().await;
        let config = AppConfig::default();

        let records = vec![
            record("UC1", "One", "one-thing.com"),
            record("UC2", "Two", "two-thing.com"),
        ];
        ingest_batch(&storage, &config, &records, &SilentProgress)
            .await
            .unwrap();

        let summary = run_enrichment(&storage, &config, &BrokenFinder, 100, &SilentProgress)
            .await
            .expect("run");
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.enriched, 0);
    }

    #[tokio::test]
    async fn no_result_counts_as_skipped() {
        let storage = test_storage().await;
        let config = AppConfig::default();

        ingest_batch(
            &storage,
            &config,
            &[record("UC1", "Ghost", "ghostsite.net")],
            &SilentProgress,
        )
        .await
        .unwrap();

        let summary = run_enrichment(&storage, &config, &EmptyFinder, 100, &SilentProgress)
            .await
            .expect("run");
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.enriched, 0);
    }

    #[tokio::test]
    async fn discovery_to_enrichment_end_to_end() {
        let storage = test_storage().await;
        let config = AppConfig::default();

        // Discovery: a YouTube creator whose description links their site.
        let summary = ingest_batch(
            &storage,
            &config,
            &[record(
                "UC123",
                "Fireship",
                "High-intensity code tutorials. https://fireship.io",
            )],
            &SilentProgress,
        )
        .await
        .unwrap();
        assert_eq!(summary.created, 1);

        let before = storage
            .get_lead_by_identity(LeadSource::YoutubeCreatorScraper, "UC123")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.email, "unknown@fireship.io");
        assert!(before.lead_score >= 20);

        // Enrichment: the collaborator finds a verified address.
        let finder = FakeFinder {
            confidence: 94,
            verified: true,
        };
        let summary = run_enrichment(&storage, &config, &finder, 100, &SilentProgress)
            .await
            .unwrap();
        assert_eq!(summary.enriched, 1);

        let after = storage.get_lead(&before.id).await.unwrap().unwrap();
        assert_eq!(after.email, "contact@fireship.io");
        assert_eq!(after.email_confidence, Some(94));
        assert!(after.email_verified);
        assert_eq!(after.qualification_level, QualificationLevel::Warm);
        assert!(after.lead_score >= before.lead_score + 25);

        // The lead no longer shows up as pending.
        assert_eq!(storage.count_pending_enrichment().await.unwrap(), 0);
    }
}
