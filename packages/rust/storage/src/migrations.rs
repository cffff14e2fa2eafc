//! SQL migration definitions for the leadloom database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: leads, enrichment_usage",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Leads, keyed by UUID; identity is the (source, external_id) pair.
-- candidate_domains is a JSON array preserving insertion order.
CREATE TABLE IF NOT EXISTS leads (
    id                  TEXT PRIMARY KEY,
    source              TEXT NOT NULL,
    external_id         TEXT NOT NULL,
    display_name        TEXT NOT NULL,
    domain              TEXT,
    email               TEXT NOT NULL,
    status              TEXT NOT NULL DEFAULT 'new',
    qualification_level TEXT NOT NULL DEFAULT 'cold',
    lead_score          INTEGER NOT NULL DEFAULT 0,
    email_confidence    INTEGER,
    email_verified      INTEGER NOT NULL DEFAULT 0,
    niche               TEXT,
    niche_confidence    REAL,
    candidate_domains   TEXT NOT NULL DEFAULT '[]',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    enriched_at         TEXT,
    UNIQUE(source, external_id)
);

-- Live emails are unique; placeholder emails (unknown@…) may collide when
-- two leads predict the same domain, so the index is partial.
CREATE UNIQUE INDEX IF NOT EXISTS idx_leads_live_email
    ON leads(email) WHERE email NOT LIKE 'unknown@%';

CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(status);
CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at);

-- Daily enrichment quota counter, shared across orchestrator runs.
CREATE TABLE IF NOT EXISTS enrichment_usage (
    day  TEXT PRIMARY KEY,
    used INTEGER NOT NULL DEFAULT 0
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
