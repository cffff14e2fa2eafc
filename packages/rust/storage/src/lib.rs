//! libSQL storage layer for the lead store.
//!
//! The [`Storage`] struct wraps a libSQL database holding leads and the
//! shared daily enrichment quota counter.
//!
//! **Access rules:**
//! - Reconciler/orchestrator: read-write (sole writer) via [`Storage::open`]
//! - Read-only consumers (dashboards, reporting): [`Storage::open_readonly`]
//!
//! The store enforces the two uniqueness invariants the reconciler relies
//! on: at most one lead per `(source, external_id)` identity, and at most
//! one lead per live (non-placeholder) email. Violations surface as
//! [`LeadLoomError::Conflict`] so callers can retry as an update.

mod migrations;

use std::path::Path;

use chrono::{DateTime, Utc};
use leadloom_shared::{
    Lead, LeadId, LeadLoomError, LeadSource, LeadStatus, QualificationLevel, Result,
};
use libsql::{Connection, Database, params};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LeadLoomError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    LeadLoomError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(LeadLoomError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lead writes
    // -----------------------------------------------------------------------

    /// Insert a new lead.
    ///
    /// A duplicate identity or live email surfaces as
    /// [`LeadLoomError::Conflict`].
    pub async fn insert_lead(&self, lead: &Lead) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "INSERT INTO leads (
                   id, source, external_id, display_name, domain, email,
                   status, qualification_level, lead_score, email_confidence,
                   email_verified, niche, niche_confidence, candidate_domains,
                   created_at, updated_at, enriched_at
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    lead.id.to_string(),
                    lead.source.as_str(),
                    lead.external_id.as_str(),
                    lead.display_name.as_str(),
                    lead.domain.as_deref(),
                    lead.email.as_str(),
                    lead.status.as_str(),
                    lead.qualification_level.as_str(),
                    i64::from(lead.lead_score),
                    lead.email_confidence.map(i64::from),
                    i64::from(lead.email_verified),
                    lead.niche.as_deref(),
                    lead.niche_confidence,
                    domains_to_json(&lead.candidate_domains)?,
                    lead.created_at.to_rfc3339(),
                    lead.updated_at.to_rfc3339(),
                    lead.enriched_at.map(|t| t.to_rfc3339()),
                ],
            )
            .await
            .map_err(map_write_err)?;
        Ok(())
    }

    /// Update the discovery-merged fields of an existing lead.
    ///
    /// Identity, email provenance and timestamps of creation stay untouched;
    /// the reconciler owns which fields change on a re-sighting.
    pub async fn update_discovery_fields(&self, lead: &Lead) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "UPDATE leads SET
                   display_name = ?1,
                   domain = ?2,
                   niche = ?3,
                   niche_confidence = ?4,
                   candidate_domains = ?5,
                   lead_score = ?6,
                   updated_at = ?7
                 WHERE id = ?8",
                params![
                    lead.display_name.as_str(),
                    lead.domain.as_deref(),
                    lead.niche.as_deref(),
                    lead.niche_confidence,
                    domains_to_json(&lead.candidate_domains)?,
                    i64::from(lead.lead_score),
                    lead.updated_at.to_rfc3339(),
                    lead.id.to_string(),
                ],
            )
            .await
            .map_err(map_write_err)?;
        Ok(())
    }

    /// Apply an accepted enrichment result to a lead.
    ///
    /// A live-email collision with another lead surfaces as
    /// [`LeadLoomError::Conflict`].
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_enrichment(
        &self,
        id: &LeadId,
        email: &str,
        email_confidence: u8,
        email_verified: bool,
        qualification_level: QualificationLevel,
        lead_score: u8,
        enriched_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "UPDATE leads SET
                   email = ?1,
                   email_confidence = ?2,
                   email_verified = ?3,
                   qualification_level = ?4,
                   lead_score = ?5,
                   enriched_at = ?6,
                   updated_at = ?6
                 WHERE id = ?7",
                params![
                    email,
                    i64::from(email_confidence),
                    i64::from(email_verified),
                    qualification_level.as_str(),
                    i64::from(lead_score),
                    enriched_at.to_rfc3339(),
                    id.to_string(),
                ],
            )
            .await
            .map_err(map_write_err)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lead reads
    // -----------------------------------------------------------------------

    /// Get a lead by its UUID.
    pub async fn get_lead(&self, id: &LeadId) -> Result<Option<Lead>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_lead(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(LeadLoomError::Storage(e.to_string())),
        }
    }

    /// Get a lead by its `(source, external_id)` identity key.
    pub async fn get_lead_by_identity(
        &self,
        source: LeadSource,
        external_id: &str,
    ) -> Result<Option<Lead>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {LEAD_COLUMNS} FROM leads WHERE source = ?1 AND external_id = ?2"
                ),
                params![source.as_str(), external_id],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_lead(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(LeadLoomError::Storage(e.to_string())),
        }
    }

    /// List leads awaiting enrichment, oldest first.
    ///
    /// A lead is pending when it has a known domain, an enrichable source,
    /// and either a placeholder email or an unverified email that has not
    /// been through an enrichment pass yet.
    pub async fn list_pending_enrichment(&self, limit: u32) -> Result<Vec<Lead>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {LEAD_COLUMNS} FROM leads
                     WHERE domain IS NOT NULL
                       AND source NOT IN ({})
                       AND (email LIKE 'unknown@%'
                            OR (email_verified = 0 AND enriched_at IS NULL))
                     ORDER BY created_at ASC, id ASC
                     LIMIT ?1",
                    protected_sources_sql()
                ),
                params![i64::from(limit)],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_lead(&row)?);
        }
        Ok(results)
    }

    /// Count leads awaiting enrichment.
    pub async fn count_pending_enrichment(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT COUNT(*) FROM leads
                     WHERE domain IS NOT NULL
                       AND source NOT IN ({})
                       AND (email LIKE 'unknown@%'
                            OR (email_verified = 0 AND enriched_at IS NULL))",
                    protected_sources_sql()
                ),
                params![],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n.max(0) as u64)
                .map_err(|e| LeadLoomError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(LeadLoomError::Storage(e.to_string())),
        }
    }

    /// List leads matching a filter, newest first.
    pub async fn list_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let mut sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE 1=1");
        let mut args: Vec<libsql::Value> = Vec::new();

        if let Some(status) = filter.status {
            args.push(status.as_str().to_string().into());
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(level) = filter.qualification_level {
            args.push(level.as_str().to_string().into());
            sql.push_str(&format!(" AND qualification_level = ?{}", args.len()));
        }
        if let Some(min) = filter.min_score {
            args.push(i64::from(min).into());
            sql.push_str(&format!(" AND lead_score >= ?{}", args.len()));
        }
        if let Some(max) = filter.max_score {
            args.push(i64::from(max).into());
            sql.push_str(&format!(" AND lead_score <= ?{}", args.len()));
        }

        args.push(i64::from(filter.limit).into());
        sql.push_str(&format!(
            " ORDER BY created_at DESC, id DESC LIMIT ?{}",
            args.len()
        ));

        let mut rows = self
            .conn
            .query(&sql, args)
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            results.push(row_to_lead(&row)?);
        }
        Ok(results)
    }

    /// Aggregate counts over the lead store.
    pub async fn stats(&self) -> Result<LeadStats> {
        let mut rows = self
            .conn
            .query(
                "SELECT
                   COUNT(*),
                   COUNT(CASE WHEN email NOT LIKE 'unknown@%' THEN 1 END),
                   COUNT(CASE WHEN email_verified = 1 THEN 1 END)
                 FROM leads",
                params![],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        let count = |row: &libsql::Row, idx: i32| {
            row.get::<i64>(idx)
                .map(|n| n.max(0) as u64)
                .map_err(|e| LeadLoomError::Storage(e.to_string()))
        };
        let (total, with_live_email, verified) = match rows.next().await {
            Ok(Some(row)) => (count(&row, 0)?, count(&row, 1)?, count(&row, 2)?),
            Ok(None) => (0, 0, 0),
            Err(e) => return Err(LeadLoomError::Storage(e.to_string())),
        };

        let pending_enrichment = self.count_pending_enrichment().await?;

        Ok(LeadStats {
            total,
            with_live_email,
            verified,
            pending_enrichment,
        })
    }

    // -----------------------------------------------------------------------
    // Daily enrichment quota
    // -----------------------------------------------------------------------

    /// How many enrichment calls have been consumed for `day`.
    pub async fn quota_used(&self, day: &str) -> Result<u32> {
        let mut rows = self
            .conn
            .query(
                "SELECT used FROM enrichment_usage WHERE day = ?1",
                params![day],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<u32>(0)
                .map_err(|e| LeadLoomError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(LeadLoomError::Storage(e.to_string())),
        }
    }

    /// Atomically consume one unit of the daily quota for `day`.
    ///
    /// Returns `true` if a unit was consumed, `false` if the quota of `max`
    /// is already exhausted. The increment-and-check happens in a single
    /// statement so overlapping runs cannot overshoot the limit.
    pub async fn try_consume_quota(&self, day: &str, max: u32) -> Result<bool> {
        self.check_writable()?;
        if max == 0 {
            return Ok(false);
        }

        let changed = self
            .conn
            .execute(
                "INSERT INTO enrichment_usage (day, used) VALUES (?1, 1)
                 ON CONFLICT(day) DO UPDATE SET used = used + 1
                 WHERE enrichment_usage.used < ?2",
                params![day, i64::from(max)],
            )
            .await
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?;

        Ok(changed > 0)
    }
}

// ---------------------------------------------------------------------------
// Filters and aggregates
// ---------------------------------------------------------------------------

/// Filter for the read-only lead listing surface.
#[derive(Debug, Clone)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub qualification_level: Option<QualificationLevel>,
    pub min_score: Option<u8>,
    pub max_score: Option<u8>,
    pub limit: u32,
}

impl Default for LeadFilter {
    fn default() -> Self {
        Self {
            status: None,
            qualification_level: None,
            min_score: None,
            max_score: None,
            limit: 50,
        }
    }
}

/// Aggregate counts over the lead store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadStats {
    pub total: u64,
    pub with_live_email: u64,
    pub verified: u64,
    pub pending_enrichment: u64,
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Column list shared by all lead SELECTs; order must match [`row_to_lead`].
const LEAD_COLUMNS: &str = "id, source, external_id, display_name, domain, email, \
     status, qualification_level, lead_score, email_confidence, email_verified, \
     niche, niche_confidence, candidate_domains, created_at, updated_at, enriched_at";

/// Quoted SQL list of protected sources, derived from the enum partition so
/// the queries cannot drift from [`LeadSource::is_protected`].
fn protected_sources_sql() -> String {
    LeadSource::ALL
        .iter()
        .filter(|s| s.is_protected())
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a database row to a [`Lead`].
fn row_to_lead(row: &libsql::Row) -> Result<Lead> {
    Ok(Lead {
        id: get_string(row, 0)?
            .parse()
            .map_err(|e| LeadLoomError::Storage(format!("invalid lead id: {e}")))?,
        source: get_string(row, 1)?
            .parse()
            .map_err(LeadLoomError::Storage)?,
        external_id: get_string(row, 2)?,
        display_name: get_string(row, 3)?,
        domain: row.get::<String>(4).ok(),
        email: get_string(row, 5)?,
        status: get_string(row, 6)?
            .parse()
            .map_err(LeadLoomError::Storage)?,
        qualification_level: get_string(row, 7)?
            .parse()
            .map_err(LeadLoomError::Storage)?,
        lead_score: row
            .get::<i64>(8)
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?
            .clamp(0, 100) as u8,
        email_confidence: row.get::<i64>(9).ok().map(|v| v.clamp(0, 100) as u8),
        email_verified: row
            .get::<i64>(10)
            .map_err(|e| LeadLoomError::Storage(e.to_string()))?
            != 0,
        niche: row.get::<String>(11).ok(),
        niche_confidence: row.get::<f64>(12).ok(),
        candidate_domains: domains_from_json(&get_string(row, 13)?)?,
        created_at: parse_datetime(&get_string(row, 14)?)?,
        updated_at: parse_datetime(&get_string(row, 15)?)?,
        enriched_at: match row.get::<String>(16).ok() {
            Some(s) => Some(parse_datetime(&s)?),
            None => None,
        },
    })
}

fn get_string(row: &libsql::Row, idx: i32) -> Result<String> {
    row.get::<String>(idx)
        .map_err(|e| LeadLoomError::Storage(e.to_string()))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LeadLoomError::Storage(format!("invalid date: {e}")))
}

fn domains_to_json(domains: &[String]) -> Result<String> {
    serde_json::to_string(domains).map_err(|e| LeadLoomError::Storage(e.to_string()))
}

fn domains_from_json(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json)
        .map_err(|e| LeadLoomError::Storage(format!("invalid candidate_domains: {e}")))
}

/// Map a write error, distinguishing uniqueness conflicts from other failures.
fn map_write_err(e: libsql::Error) -> LeadLoomError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        LeadLoomError::Conflict(msg)
    } else {
        LeadLoomError::Storage(msg)
    }
}
