//! Shared types, error model, and configuration for leadloom.
//!
//! This crate is the foundation depended on by all other leadloom crates.
//! It provides:
//! - [`LeadLoomError`] — the unified error type
//! - Domain types ([`Lead`], [`LeadSource`], [`DiscoveryRecord`], [`EnrichmentResult`])
//! - Configuration ([`AppConfig`], config loading and validation)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EnrichmentConfig, NicheConfig, PredictConfig, ScoringConfig, WeightedKeyword,
    config_dir, config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{LeadLoomError, Result};
pub use types::{
    DiscoveryRecord, EnrichmentResult, Lead, LeadId, LeadSource, LeadStatus, QualificationLevel,
    is_placeholder_email, placeholder_email,
};
