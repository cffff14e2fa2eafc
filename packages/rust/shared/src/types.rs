//! Core domain types for the leadloom reconciliation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// LeadId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for lead identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub Uuid);

impl LeadId {
    /// Generate a new time-sortable lead identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LeadId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// LeadSource
// ---------------------------------------------------------------------------

/// The channel a lead originally came from.
///
/// Assigned once at creation and never changed afterwards; the provenance
/// policy depends on the original source staying intact across re-sightings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Manual,
    DemoChat,
    Api,
    YoutubeCreatorScraper,
    DomainScraping,
    GithubEnhancement,
    TwitterEnhancement,
    HunterEnrichment,
}

impl LeadSource {
    /// Every source variant, in declaration order.
    pub const ALL: [LeadSource; 8] = [
        Self::Manual,
        Self::DemoChat,
        Self::Api,
        Self::YoutubeCreatorScraper,
        Self::DomainScraping,
        Self::GithubEnhancement,
        Self::TwitterEnhancement,
        Self::HunterEnrichment,
    ];

    /// Protected sources carry operator-entered emails that automated
    /// enrichment must never overwrite.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Manual | Self::DemoChat | Self::Api)
    }

    /// Whether this source is an email-enrichment collaborator.
    pub fn is_enrichment(&self) -> bool {
        matches!(self, Self::HunterEnrichment)
    }

    /// Stable string form used in storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::DemoChat => "demo_chat",
            Self::Api => "api",
            Self::YoutubeCreatorScraper => "youtube_creator_scraper",
            Self::DomainScraping => "domain_scraping",
            Self::GithubEnhancement => "github_enhancement",
            Self::TwitterEnhancement => "twitter_enhancement",
            Self::HunterEnrichment => "hunter_enrichment",
        }
    }
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "demo_chat" => Ok(Self::DemoChat),
            "api" => Ok(Self::Api),
            "youtube_creator_scraper" => Ok(Self::YoutubeCreatorScraper),
            "domain_scraping" => Ok(Self::DomainScraping),
            "github_enhancement" => Ok(Self::GithubEnhancement),
            "twitter_enhancement" => Ok(Self::TwitterEnhancement),
            "hunter_enrichment" => Ok(Self::HunterEnrichment),
            other => Err(format!("unknown lead source: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// LeadStatus / QualificationLevel
// ---------------------------------------------------------------------------

/// Lead lifecycle status. Leads are never deleted; `Archived` is the soft
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Customer,
    Unsubscribed,
    Archived,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Customer => "customer",
            Self::Unsubscribed => "unsubscribed",
            Self::Archived => "archived",
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "customer" => Ok(Self::Customer),
            "unsubscribed" => Ok(Self::Unsubscribed),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown lead status: {other}")),
        }
    }
}

/// How warm a lead is for outreach purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationLevel {
    Cold,
    Warm,
    Hot,
    Customer,
}

impl QualificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
            Self::Hot => "hot",
            Self::Customer => "customer",
        }
    }
}

impl std::str::FromStr for QualificationLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cold" => Ok(Self::Cold),
            "warm" => Ok(Self::Warm),
            "hot" => Ok(Self::Hot),
            "customer" => Ok(Self::Customer),
            other => Err(format!("unknown qualification level: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A discovered entity tracked for outreach, stored in the database.
///
/// Identity is the `(source, external_id)` pair; a lead may exist before a
/// real email is known, carrying an `unknown@…` placeholder until enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// Unique lead identifier (UUID v7).
    pub id: LeadId,
    /// Origin channel, fixed at creation.
    pub source: LeadSource,
    /// Identifier within the origin platform (e.g. a YouTube channel ID).
    pub external_id: String,
    /// Display name of the creator or business.
    pub display_name: String,
    /// Best-known website domain, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Contact email, possibly a placeholder.
    pub email: String,
    /// Lifecycle status.
    pub status: LeadStatus,
    /// Outreach warmth.
    pub qualification_level: QualificationLevel,
    /// Deterministic score in [0, 100], recomputed on every mutation.
    pub lead_score: u8,
    /// Confidence reported by the enrichment collaborator, if enriched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confidence: Option<u8>,
    /// Whether the email was verified deliverable.
    pub email_verified: bool,
    /// Classified niche label, updatable on re-discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niche: Option<String>,
    /// Classifier confidence for the niche label, 0.0–1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niche_confidence: Option<f64>,
    /// Candidate domains seen across sightings, insertion-ordered, deduplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidate_domains: Vec<String>,
    /// When the lead was first created.
    pub created_at: DateTime<Utc>,
    /// When the lead was last mutated.
    pub updated_at: DateTime<Utc>,
    /// When an enrichment result was last applied, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// DiscoveryRecord / EnrichmentResult
// ---------------------------------------------------------------------------

/// A transient record produced by a discovery collaborator (YouTube, Twitter
/// or GitHub scan). Consumed once by the reconciler, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// Origin channel of the sighting.
    pub source: LeadSource,
    /// Identifier within the origin platform.
    pub external_id: String,
    /// Display name as seen on the platform.
    pub display_name: String,
    /// Free text (channel/profile description) for classification.
    #[serde(default)]
    pub raw_text: String,
    /// Candidate website domains, most likely first.
    #[serde(default)]
    pub candidate_domains: Vec<String>,
    /// Niche hint from the collaborator, if it already classified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niche_hint: Option<String>,
}

/// A transient record returned by the email-enrichment collaborator.
/// Not persisted independently; merged into a [`Lead`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Candidate email address.
    pub email: String,
    /// Collaborator confidence, 0–100.
    pub confidence: u8,
    /// Whether the collaborator verified the email deliverable.
    pub verified: bool,
    /// The domain the email was discovered for.
    pub domain: String,
}

// ---------------------------------------------------------------------------
// Placeholder emails
// ---------------------------------------------------------------------------

/// Prefix identifying synthetic, non-deliverable placeholder emails.
const PLACEHOLDER_PREFIX: &str = "unknown@";

/// Whether an email is a synthetic placeholder standing in until enrichment.
pub fn is_placeholder_email(email: &str) -> bool {
    email.starts_with(PLACEHOLDER_PREFIX)
}

/// Build the placeholder email for a new lead: `unknown@<first candidate
/// domain>`, or `unknown@<external_id>.invalid` when no candidate domain
/// exists. An external_id with no alphanumeric characters falls back to a
/// fixed label so the host part is never empty.
pub fn placeholder_email(external_id: &str, candidate_domains: &[String]) -> String {
    match candidate_domains.first() {
        Some(domain) => format!("{PLACEHOLDER_PREFIX}{domain}"),
        None => {
            let mut id: String = external_id
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if id.is_empty() {
                id = "lead".into();
            }
            format!("{PLACEHOLDER_PREFIX}{id}.invalid")
        }
    }
}
