//! The lead merge engine.
//!
//! Consumes transient [`DiscoveryRecord`]s and [`EnrichmentResult`]s and
//! folds them into the lead store, enforcing identity uniqueness, the
//! provenance policy and score recomputation on every mutation.

use chrono::Utc;
use leadloom_predict::{UNCATEGORIZED, classify, extract_domains, predict};
use leadloom_shared::{
    AppConfig, DiscoveryRecord, EnrichmentResult, Lead, LeadId, LeadLoomError, LeadSource,
    LeadStatus, QualificationLevel, Result, placeholder_email,
};
use leadloom_storage::Storage;
use tracing::{debug, instrument, warn};

use crate::policy::may_overwrite_email;
use crate::score::compute_score;

/// What an ingested discovery record did to the lead store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new lead was created for a previously unseen identity.
    Created(LeadId),
    /// An existing lead with the same identity was merged into.
    Updated(LeadId),
}

impl IngestOutcome {
    pub fn lead_id(&self) -> &LeadId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

/// Merges discovery sightings and enrichment results into the lead store.
pub struct Reconciler<'a> {
    storage: &'a Storage,
    config: &'a AppConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(storage: &'a Storage, config: &'a AppConfig) -> Self {
        Self { storage, config }
    }

    /// Ingest one discovery sighting: create the lead if its
    /// `(source, external_id)` identity is new, otherwise merge into the
    /// existing lead.
    ///
    /// An identity race lost against a concurrent insert is retried as the
    /// update path, so one identity never yields two leads.
    #[instrument(skip_all, fields(source = %record.source, external_id = %record.external_id))]
    pub async fn ingest_discovery(&self, record: &DiscoveryRecord) -> Result<IngestOutcome> {
        validate_record(record)?;

        let candidates = self.collect_candidates(record);
        let niche = self.classify_niche(record);

        if let Some(existing) = self
            .storage
            .get_lead_by_identity(record.source, &record.external_id)
            .await?
        {
            return self.merge_sighting(existing, record, &candidates, niche).await;
        }

        self.insert_new(record, &candidates, niche).await
    }

    /// Insert a brand-new lead for an identity the lookup missed.
    ///
    /// A concurrent writer may claim the identity between the lookup and
    /// the insert; the unique constraint surfaces that as a conflict, and
    /// the losing sighting merges into the winner instead.
    async fn insert_new(
        &self,
        record: &DiscoveryRecord,
        candidates: &[String],
        niche: Option<(String, Option<f64>)>,
    ) -> Result<IngestOutcome> {
        let lead = self.new_lead(record, candidates, niche);
        match self.storage.insert_lead(&lead).await {
            Ok(()) => {
                debug!(lead_id = %lead.id, "lead created");
                Ok(IngestOutcome::Created(lead.id))
            }
            Err(e) if e.is_conflict() => {
                // Lost the identity race; the winner absorbs this sighting.
                match self
                    .storage
                    .get_lead_by_identity(record.source, &record.external_id)
                    .await?
                {
                    Some(existing) => {
                        let niche = self.classify_niche(record);
                        self.merge_sighting(existing, record, candidates, niche)
                            .await
                    }
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Apply an enrichment result to a lead, subject to the provenance
    /// policy.
    ///
    /// Returns `Ok(false)` when the policy refuses the overwrite or the
    /// email is already live on another lead; both are normal outcomes.
    #[instrument(skip_all, fields(lead_id = %lead_id))]
    pub async fn ingest_enrichment(
        &self,
        lead_id: &LeadId,
        result: &EnrichmentResult,
    ) -> Result<bool> {
        if result.email.trim().is_empty() || !result.email.contains('@') {
            return Err(LeadLoomError::validation(format!(
                "malformed enrichment email: {:?}",
                result.email
            )));
        }

        let lead = self
            .storage
            .get_lead(lead_id)
            .await?
            .ok_or_else(|| LeadLoomError::validation(format!("unknown lead: {lead_id}")))?;

        let confidence = result.confidence.min(100);
        let allowed = may_overwrite_email(
            lead.source,
            &lead.email,
            LeadSource::HunterEnrichment,
            confidence,
            self.config.enrichment.min_confidence,
        );
        if !allowed {
            debug!(source = %lead.source, "provenance policy refused email overwrite");
            return Ok(false);
        }

        let score = compute_score(
            lead.source,
            Some(confidence),
            lead.domain.as_deref(),
            &self.config.scoring,
        );
        // A verified email moves a cold lead to warm; never demote.
        let qualification = if result.verified {
            lead.qualification_level.max(QualificationLevel::Warm)
        } else {
            lead.qualification_level
        };

        match self
            .storage
            .apply_enrichment(
                lead_id,
                &result.email,
                confidence,
                result.verified,
                qualification,
                score,
                Utc::now(),
            )
            .await
        {
            Ok(()) => Ok(true),
            Err(e) if e.is_conflict() => {
                warn!(email = %result.email, "email already live on another lead, skipping");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    /// Candidate domains for a sighting: the collaborator's own candidates
    /// first, then domains extracted from the profile text, then predicted
    /// ones. Insertion-ordered, deduplicated.
    fn collect_candidates(&self, record: &DiscoveryRecord) -> Vec<String> {
        let mut candidates = Vec::new();
        let mut push = |domain: String| {
            if !domain.is_empty() && !candidates.contains(&domain) {
                candidates.push(domain);
            }
        };

        for domain in &record.candidate_domains {
            push(domain.to_lowercase());
        }
        for domain in extract_domains(&record.raw_text) {
            push(domain);
        }
        for domain in predict(&record.display_name, &self.config.prediction) {
            push(domain);
        }

        candidates
    }

    /// Classify the sighting's niche, honoring an explicit collaborator hint.
    fn classify_niche(&self, record: &DiscoveryRecord) -> Option<(String, Option<f64>)> {
        if let Some(hint) = &record.niche_hint {
            if !hint.trim().is_empty() {
                return Some((hint.to_lowercase(), None));
            }
        }

        let text = format!("{} {}", record.display_name, record.raw_text);
        let (label, confidence) = classify(&text, &self.config.niches);
        if label == UNCATEGORIZED {
            None
        } else {
            Some((label, Some(confidence)))
        }
    }

    fn new_lead(
        &self,
        record: &DiscoveryRecord,
        candidates: &[String],
        niche: Option<(String, Option<f64>)>,
    ) -> Lead {
        let now = Utc::now();
        let domain = candidates.first().cloned();
        let email = placeholder_email(&record.external_id, candidates);
        let (niche, niche_confidence) = match niche {
            Some((label, conf)) => (Some(label), conf),
            None => (None, None),
        };
        let score = compute_score(record.source, None, domain.as_deref(), &self.config.scoring);

        Lead {
            id: LeadId::new(),
            source: record.source,
            external_id: record.external_id.clone(),
            display_name: record.display_name.clone(),
            domain,
            email,
            status: LeadStatus::New,
            qualification_level: QualificationLevel::Cold,
            lead_score: score,
            email_confidence: None,
            email_verified: false,
            niche,
            niche_confidence,
            candidate_domains: candidates.to_vec(),
            created_at: now,
            updated_at: now,
            enriched_at: None,
        }
    }

    /// Merge a re-sighting into an existing lead. Identity, email and
    /// provenance stay untouched; descriptive fields refresh and the
    /// candidate-domain union grows.
    async fn merge_sighting(
        &self,
        mut lead: Lead,
        record: &DiscoveryRecord,
        candidates: &[String],
        niche: Option<(String, Option<f64>)>,
    ) -> Result<IngestOutcome> {
        lead.display_name = record.display_name.clone();

        for domain in candidates {
            if !lead.candidate_domains.contains(domain) {
                lead.candidate_domains.push(domain.clone());
            }
        }
        // A domain learned late feeds scoring and enrichment; the stored
        // email stays with the enrichment path once the lead exists.
        if lead.domain.is_none() {
            lead.domain = lead.candidate_domains.first().cloned();
        }

        if let Some((label, confidence)) = niche {
            lead.niche = Some(label);
            lead.niche_confidence = confidence;
        }

        lead.lead_score = compute_score(
            lead.source,
            lead.email_confidence,
            lead.domain.as_deref(),
            &self.config.scoring,
        );
        lead.updated_at = Utc::now();

        self.storage.update_discovery_fields(&lead).await?;
        debug!(lead_id = %lead.id, "lead merged");
        Ok(IngestOutcome::Updated(lead.id))
    }
}

fn validate_record(record: &DiscoveryRecord) -> Result<()> {
    if record.external_id.trim().is_empty() {
        return Err(LeadLoomError::validation("external_id must not be empty"));
    }
    if record.display_name.trim().is_empty() {
        return Err(LeadLoomError::validation("display_name must not be empty"));
    }
    Ok(())
}
