//! File-backed batch runner: load the stored corpus and the collectors'
//! incoming items, run one analysis batch, write the results back.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use brandsignal_analysis::{run_batch, RunStats};
use brandsignal_common::config::load_config;
use brandsignal_common::{parse_items, FileConfig, Item};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "brandsignal-batch",
    about = "Tag, score, and burst-check newly collected brand mentions"
)]
pub struct Cli {
    /// Stored corpus (JSON array). A missing file is an empty corpus.
    #[arg(long, env = "BRANDSIGNAL_CORPUS")]
    pub corpus: PathBuf,

    /// Newly collected items (JSON array).
    #[arg(long, env = "BRANDSIGNAL_INCOMING")]
    pub incoming: PathBuf,

    /// Where to write the updated corpus. Defaults to overwriting --corpus.
    #[arg(long, env = "BRANDSIGNAL_OUT")]
    pub out: Option<PathBuf>,

    /// Where to write the aggregate report. Printed to stdout when unset.
    #[arg(long, env = "BRANDSIGNAL_REPORT")]
    pub report: Option<PathBuf>,

    /// Path to config TOML file
    #[arg(long, env = "BRANDSIGNAL_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Install the global subscriber. `RUST_LOG` directives are honored on top of
/// the `brandsignal=info` default.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("brandsignal=info".parse()?);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read a JSON array of items. Any structural problem fails the batch.
pub async fn load_items(path: &Path) -> Result<Vec<Item>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read items: {}", path.display()))?;
    let items =
        parse_items(&raw).with_context(|| format!("Failed to parse items: {}", path.display()))?;
    Ok(items)
}

/// Like [`load_items`], but a corpus that does not exist yet is empty.
pub async fn load_corpus(path: &Path) -> Result<Vec<Item>> {
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to stat corpus: {}", path.display()))?;
    if !exists {
        warn!(path = %path.display(), "No stored corpus yet, starting empty");
        return Ok(Vec::new());
    }
    load_items(path).await
}

pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Newest first; items without a parseable timestamp go last in stored order.
pub fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.parsed_timestamp().cmp(&a.parsed_timestamp()));
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn resolve_config(cli: &Cli) -> Result<FileConfig> {
    let config = match &cli.config {
        Some(path) => {
            info!(config = %path.display(), "Loading config");
            load_config(path)?
        }
        None => FileConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// One full batch: load, analyze, persist.
pub async fn run(cli: &Cli, now: DateTime<Utc>) -> Result<RunStats> {
    let config = resolve_config(cli)?;

    let existing = load_corpus(&cli.corpus).await?;
    let incoming = load_items(&cli.incoming).await?;
    info!(
        stored = existing.len(),
        incoming = incoming.len(),
        "Loaded items"
    );

    let outcome = run_batch(existing, incoming, &config, now)?;

    let mut items = outcome.items;
    sort_newest_first(&mut items);
    let out = cli.out.as_deref().unwrap_or(cli.corpus.as_path());
    write_json(out, &items).await?;
    info!(path = %out.display(), items = items.len(), "Corpus written");

    match &cli.report {
        Some(path) => {
            write_json(path, &outcome.report).await?;
            info!(path = %path.display(), "Report written");
        }
        None => println!("{}", serde_json::to_string_pretty(&outcome.report)?),
    }

    Ok(outcome.stats)
}
