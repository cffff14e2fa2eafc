//! Application configuration for leadloom.
//!
//! User config lives at `~/.leadloom/leadloom.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LeadLoomError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "leadloom.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".leadloom";

// ---------------------------------------------------------------------------
// Config structs (matching leadloom.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Email-enrichment collaborator settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Domain-prediction settings.
    #[serde(default)]
    pub prediction: PredictConfig,

    /// Lead-scoring settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Niche keyword tables used by the classifier.
    #[serde(default = "default_niches")]
    pub niches: Vec<NicheConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enrichment: EnrichmentConfig::default(),
            prediction: PredictConfig::default(),
            scoring: ScoringConfig::default(),
            niches: default_niches(),
        }
    }
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the Hunter-compatible API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Minimum collaborator confidence for an email to replace a previously
    /// enriched, non-placeholder email.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,

    /// Maximum collaborator calls per day, shared across runs.
    #[serde(default = "default_daily_quota")]
    pub daily_quota: u32,

    /// UTC hour at which the daily quota counter resets.
    #[serde(default)]
    pub quota_reset_hour_utc: u8,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            api_base_url: default_api_base_url(),
            min_confidence: default_min_confidence(),
            daily_quota: default_daily_quota(),
            quota_reset_hour_utc: 0,
        }
    }
}

fn default_api_key_env() -> String {
    "HUNTER_API_KEY".into()
}
fn default_api_base_url() -> String {
    "https://api.hunter.io/v2".into()
}
fn default_min_confidence() -> u8 {
    50
}
fn default_daily_quota() -> u32 {
    25
}

/// `[prediction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// TLDs tried for each name variant, in order of preference.
    #[serde(default = "default_tlds")]
    pub tlds: Vec<String>,

    /// Prefixes combined with the bare name (e.g. `the<name>.com`).
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,

    /// Suffixes combined with the bare name (e.g. `<name>official.com`).
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,

    /// Upper bound on predicted candidates per name.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            tlds: default_tlds(),
            prefixes: default_prefixes(),
            suffixes: default_suffixes(),
            max_candidates: default_max_candidates(),
        }
    }
}

fn default_tlds() -> Vec<String> {
    vec![".com".into(), ".net".into()]
}
fn default_prefixes() -> Vec<String> {
    vec!["the".into()]
}
fn default_suffixes() -> Vec<String> {
    vec!["official".into()]
}
fn default_max_candidates() -> usize {
    6
}

/// `[scoring]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// TLDs considered premium for the domain-quality bonus.
    #[serde(default = "default_premium_tlds")]
    pub premium_tlds: Vec<String>,

    /// Keywords in a domain that mark it as a business domain.
    #[serde(default = "default_business_keywords")]
    pub business_keywords: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            premium_tlds: default_premium_tlds(),
            business_keywords: default_business_keywords(),
        }
    }
}

fn default_premium_tlds() -> Vec<String> {
    vec![".com".into(), ".org".into(), ".net".into()]
}
fn default_business_keywords() -> Vec<String> {
    [
        "business",
        "entrepreneur",
        "marketing",
        "consulting",
        "coach",
        "agency",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ---------------------------------------------------------------------------
// Niche keyword tables
// ---------------------------------------------------------------------------

/// A keyword and its weight within a niche.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub keyword: String,
    pub weight: u32,
}

impl WeightedKeyword {
    fn new(keyword: &str, weight: u32) -> Self {
        Self {
            keyword: keyword.into(),
            weight,
        }
    }
}

/// `[[niches]]` entry — one target niche and its weighted keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NicheConfig {
    /// Niche label (e.g. "gaming").
    pub label: String,
    /// Weighted keywords matched against profile text.
    pub keywords: Vec<WeightedKeyword>,
}

/// Default niche tables for the target creator segments.
fn default_niches() -> Vec<NicheConfig> {
    let table: &[(&str, &[(&str, u32)])] = &[
        (
            "business",
            &[
                ("business", 2),
                ("entrepreneur", 2),
                ("startup", 1),
                ("marketing", 1),
                ("sales", 1),
                ("coaching", 1),
            ],
        ),
        (
            "creative",
            &[
                ("art", 2),
                ("design", 2),
                ("music", 1),
                ("creative", 1),
                ("drawing", 1),
                ("craft", 1),
            ],
        ),
        (
            "education",
            &[
                ("tutorial", 2),
                ("education", 2),
                ("learning", 1),
                ("course", 1),
                ("teach", 1),
                ("how to", 1),
            ],
        ),
        (
            "fitness",
            &[
                ("fitness", 2),
                ("workout", 2),
                ("gym", 1),
                ("health", 1),
                ("nutrition", 1),
                ("wellness", 1),
            ],
        ),
        (
            "gaming",
            &[
                ("gaming", 2),
                ("gamer", 2),
                ("esports", 1),
                ("streamer", 1),
                ("gameplay", 1),
                ("let's play", 1),
            ],
        ),
        (
            "technology",
            &[
                ("tech", 2),
                ("coding", 2),
                ("programming", 1),
                ("software", 1),
                ("developer", 1),
            ],
        ),
    ];

    table
        .iter()
        .map(|(label, keywords)| NicheConfig {
            label: (*label).into(),
            keywords: keywords
                .iter()
                .map(|(kw, w)| WeightedKeyword::new(kw, *w))
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Validate invariants that serde cannot express.
    ///
    /// Rejects empty niche tables, empty or zero-weight keywords, duplicate
    /// niche labels, and keywords claimed by more than one niche.
    pub fn validate(&self) -> Result<()> {
        if self.niches.is_empty() {
            return Err(LeadLoomError::config("no niches configured"));
        }

        let mut seen_labels = std::collections::HashSet::new();
        let mut seen_keywords: std::collections::HashMap<String, String> =
            std::collections::HashMap::new();

        for niche in &self.niches {
            if niche.label.trim().is_empty() {
                return Err(LeadLoomError::config("niche with empty label"));
            }
            if !seen_labels.insert(niche.label.clone()) {
                return Err(LeadLoomError::config(format!(
                    "duplicate niche label: {}",
                    niche.label
                )));
            }
            if niche.keywords.is_empty() {
                return Err(LeadLoomError::config(format!(
                    "niche '{}' has an empty keyword set",
                    niche.label
                )));
            }
            for kw in &niche.keywords {
                if kw.keyword.trim().is_empty() {
                    return Err(LeadLoomError::config(format!(
                        "niche '{}' contains an empty keyword",
                        niche.label
                    )));
                }
                if kw.weight == 0 {
                    return Err(LeadLoomError::config(format!(
                        "keyword '{}' in niche '{}' has zero weight",
                        kw.keyword, niche.label
                    )));
                }
                let key = kw.keyword.to_lowercase();
                if let Some(owner) = seen_keywords.get(&key) {
                    return Err(LeadLoomError::config(format!(
                        "keyword '{}' appears in both '{}' and '{}'",
                        kw.keyword, owner, niche.label
                    )));
                }
                seen_keywords.insert(key, niche.label.clone());
            }
        }

        if self.enrichment.min_confidence > 100 {
            return Err(LeadLoomError::config(
                "enrichment.min_confidence must be in 0..=100",
            ));
        }
        if self.enrichment.quota_reset_hour_utc > 23 {
            return Err(LeadLoomError::config(
                "enrichment.quota_reset_hour_utc must be in 0..=23",
            ));
        }
        if self.prediction.max_candidates == 0 {
            return Err(LeadLoomError::config(
                "prediction.max_candidates must be at least 1",
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.leadloom/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LeadLoomError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.leadloom/leadloom.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LeadLoomError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        LeadLoomError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LeadLoomError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LeadLoomError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LeadLoomError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the enrichment API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.enrichment.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(LeadLoomError::config(format!(
            "enrichment API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("min_confidence"));
        assert!(toml_str.contains("HUNTER_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.enrichment.min_confidence, 50);
        assert_eq!(parsed.enrichment.daily_quota, 25);
        assert_eq!(parsed.prediction.max_candidates, 6);
        parsed.validate().expect("default config validates");
    }

    #[test]
    fn default_niches_validate() {
        let config = AppConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.niches.len(), 6);
    }

    #[test]
    fn empty_keyword_set_rejected() {
        let mut config = AppConfig::default();
        config.niches.push(NicheConfig {
            label: "empty".into(),
            keywords: vec![],
        });
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty keyword set"));
    }

    #[test]
    fn overlapping_keywords_rejected() {
        let mut config = AppConfig::default();
        config.niches.push(NicheConfig {
            label: "also-gaming".into(),
            keywords: vec![WeightedKeyword::new("gaming", 1)],
        });
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("appears in both"));
    }

    #[test]
    fn duplicate_label_rejected() {
        let mut config = AppConfig::default();
        config.niches.push(NicheConfig {
            label: "gaming".into(),
            keywords: vec![WeightedKeyword::new("speedrun", 1)],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn custom_config_parses() {
        let toml_str = r#"
[enrichment]
min_confidence = 70
daily_quota = 5

[[niches]]
label = "cooking"
keywords = [{ keyword = "recipe", weight = 2 }, { keyword = "baking", weight = 1 }]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.enrichment.min_confidence, 70);
        assert_eq!(config.enrichment.daily_quota, 5);
        assert_eq!(config.niches.len(), 1);
        assert_eq!(config.niches[0].label, "cooking");
        config.validate().expect("valid");
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.enrichment.api_key_env = "LL_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
