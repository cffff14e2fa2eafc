//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use leadloom_core::orchestrator::quota_day;
use leadloom_core::pipeline::ProgressReporter;
use leadloom_enrich::HunterClient;
use leadloom_shared::{
    AppConfig, DiscoveryRecord, config_dir, init_config, load_config, validate_api_key,
};
use leadloom_storage::{LeadFilter, Storage};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// leadloom — deduplicate, score and enrich leads from every source.
#[derive(Parser)]
#[command(
    name = "leadloom",
    version,
    about = "Reconcile discovery records into a deduplicated, enriched lead store.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the lead database (defaults to ~/.leadloom/leadloom.db).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ingest a batch of discovery records from a JSON file.
    Ingest {
        /// Path to a JSON array of discovery records.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Run an enrichment pass over pending leads.
    Enrich {
        /// Maximum number of leads to attempt this run.
        #[arg(short, long, default_value = "50")]
        limit: u32,
    },

    /// List leads in the store.
    List {
        /// Filter by lifecycle status (new, contacted, qualified, ...).
        #[arg(long)]
        status: Option<String>,

        /// Filter by qualification level (cold, warm, hot, customer).
        #[arg(long)]
        level: Option<String>,

        /// Minimum lead score.
        #[arg(long)]
        min_score: Option<u8>,

        /// Maximum number of leads to show.
        #[arg(short, long, default_value = "50")]
        limit: u32,
    },

    /// Show aggregate lead and quota statistics.
    Stats,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadloom=info",
        1 => "leadloom=debug",
        _ => "leadloom=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => config_dir()?.join("leadloom.db"),
    };

    match cli.command {
        Command::Ingest { file } => cmd_ingest(&db_path, &file).await,
        Command::Enrich { limit } => cmd_enrich(&db_path, limit).await,
        Command::List {
            status,
            level,
            min_score,
            limit,
        } => cmd_list(&db_path, status.as_deref(), level.as_deref(), min_score, limit).await,
        Command::Stats => cmd_stats(&db_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(db_path: &PathBuf, file: &PathBuf) -> Result<()> {
    let config = load_config()?;

    let content = std::fs::read_to_string(file)
        .map_err(|e| eyre!("cannot read '{}': {e}", file.display()))?;
    let records: Vec<DiscoveryRecord> = serde_json::from_str(&content)
        .map_err(|e| eyre!("'{}' is not a valid discovery batch: {e}", file.display()))?;

    info!(records = records.len(), db = %db_path.display(), "ingesting discovery batch");

    let storage = Storage::open(db_path).await?;
    let reporter = CliProgress::new();
    let summary =
        leadloom_core::pipeline::ingest_batch(&storage, &config, &records, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Ingestion complete");
    println!("  Processed: {}", summary.processed);
    println!("  Created:   {}", summary.created);
    println!("  Updated:   {}", summary.updated);
    println!("  Skipped:   {}", summary.skipped);
    println!();

    Ok(())
}

async fn cmd_enrich(db_path: &PathBuf, limit: u32) -> Result<()> {
    let config = load_config()?;
    validate_api_key(&config)?;

    let api_key = std::env::var(&config.enrichment.api_key_env)
        .map_err(|_| eyre!("missing {} in environment", config.enrichment.api_key_env))?;
    let finder = HunterClient::new(
        &config.enrichment.api_base_url,
        &api_key,
        config.enrichment.min_confidence,
    )?;

    let storage = Storage::open(db_path).await?;
    let reporter = CliProgress::new();
    let summary =
        leadloom_core::orchestrator::run_enrichment(&storage, &config, &finder, limit, &reporter)
            .await?;
    reporter.finish();

    let day = quota_day(chrono::Utc::now(), config.enrichment.quota_reset_hour_utc);
    let used = storage.quota_used(&day).await?;

    println!();
    println!("  Enrichment run complete");
    println!("  Processed: {}", summary.processed);
    println!("  Enriched:  {}", summary.enriched);
    println!("  Skipped:   {}", summary.skipped);
    println!("  Failed:    {}", summary.failed);
    println!("  Deferred:  {}", summary.deferred);
    println!(
        "  Quota:     {used}/{} used for {day}",
        config.enrichment.daily_quota
    );
    println!();

    Ok(())
}

async fn cmd_list(
    db_path: &PathBuf,
    status: Option<&str>,
    level: Option<&str>,
    min_score: Option<u8>,
    limit: u32,
) -> Result<()> {
    let storage = Storage::open_readonly(db_path).await?;

    let filter = LeadFilter {
        status: status
            .map(|s| s.parse().map_err(|e: String| eyre!(e)))
            .transpose()?,
        qualification_level: level
            .map(|s| s.parse().map_err(|e: String| eyre!(e)))
            .transpose()?,
        min_score,
        max_score: None,
        limit,
    };

    let leads = storage.list_leads(&filter).await?;
    if leads.is_empty() {
        println!("No leads match.");
        return Ok(());
    }

    println!(
        "{:<24} {:<24} {:<30} {:>5}  {:<6} {}",
        "SOURCE", "NAME", "EMAIL", "SCORE", "LEVEL", "NICHE"
    );
    for lead in &leads {
        println!(
            "{:<24} {:<24} {:<30} {:>5}  {:<6} {}",
            lead.source,
            truncate(&lead.display_name, 24),
            truncate(&lead.email, 30),
            lead.lead_score,
            lead.qualification_level.as_str(),
            lead.niche.as_deref().unwrap_or("-"),
        );
    }
    println!();
    println!("{} lead(s)", leads.len());

    Ok(())
}

async fn cmd_stats(db_path: &PathBuf) -> Result<()> {
    let config = load_config()?;
    let storage = Storage::open_readonly(db_path).await?;
    let stats = storage.stats().await?;

    let day = quota_day(chrono::Utc::now(), config.enrichment.quota_reset_hour_utc);
    let used = storage.quota_used(&day).await?;

    println!();
    println!("  Lead store statistics");
    println!("  Total leads:     {}", stats.total);
    println!("  Live emails:     {}", stats.with_live_email);
    println!("  Verified emails: {}", stats.verified);
    println!("  Pending enrich:  {}", stats.pending_enrichment);
    println!(
        "  Quota today:     {used}/{} ({day})",
        config.enrichment.daily_quota
    );
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record_done(&self, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Reconciling [{current}/{total}]"));
    }

    fn lead_enriched(&self, email: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Enriched [{current}/{total}] {email}"));
    }
}
