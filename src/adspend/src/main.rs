//! adspend — joins daily business outcomes with per-channel paid media
//! performance and writes the processed tables for reporting.

use adspend_core::config::{AppConfig, LogConfig};
use adspend_reporting::{
    DateRange, MarketingPipeline, MarketingSource, Normalizer, PipelineInput, RunSummary,
};
use adspend_storage::writer::SUMMARY_FILE;
use adspend_storage::{read_source_table, OutputWriter};
use anyhow::bail;
use chrono::NaiveDate;
use clap::Parser;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "adspend")]
#[command(about = "Normalize channel spend exports and join them with daily business performance")]
#[command(version)]
struct Cli {
    /// Config file (TOML), without or with extension
    #[arg(long)]
    config: Option<String>,

    /// Directory holding the business and channel CSV exports (overrides config)
    #[arg(long, env = "ADSPEND__DATA_DIR")]
    data_dir: Option<String>,

    /// Directory the processed tables are written to (overrides config)
    #[arg(long, env = "ADSPEND__OUTPUT_DIR")]
    output_dir: Option<String>,

    /// First day of the summary window (YYYY-MM-DD)
    #[arg(long)]
    summary_from: Option<NaiveDate>,

    /// Last day of the summary window (YYYY-MM-DD)
    #[arg(long)]
    summary_to: Option<NaiveDate>,
}

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log.filter.as_str().into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref());
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };
    init_tracing(&config.log);
    if let Err(e) = loaded {
        // A file named on the command line is not optional.
        if cli.config.is_some() {
            return Err(e.into());
        }
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Apply CLI overrides
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let span = tracing::info_span!("run", run_id = %Uuid::new_v4());
    let _enter = span.enter();

    info!(
        data_dir = %config.data_dir,
        output_dir = %config.output_dir,
        sources = config.sources.len(),
        "Configuration loaded"
    );

    let data_dir = Path::new(&config.data_dir);
    let business = read_source_table(&data_dir.join(&config.business_file), "business")?;
    let mut marketing = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let table = read_source_table(&data_dir.join(&source.file), source.channel.as_str())?;
        info!(channel = %source.channel, rows = table.len(), "Loaded channel export");
        marketing.push(MarketingSource::new(source.channel, table));
    }

    let pipeline = MarketingPipeline::new(Normalizer::from_config(&config.schema));
    let output = pipeline.run(&PipelineInput { business, marketing })?;

    let range = match (cli.summary_from, cli.summary_to) {
        (Some(from), Some(to)) => Some(DateRange::new(from, to)),
        (None, None) => None,
        (from, to) => DateRange::covering(&output.combined)
            .map(|full| DateRange::new(from.unwrap_or(full.start), to.unwrap_or(full.end))),
    };
    if let Some(r) = &range {
        if r.start > r.end {
            bail!("summary window starts after it ends: {} > {}", r.start, r.end);
        }
    }
    let summary = RunSummary::compute(&output.combined, &output.marketing, range);

    // Everything is computed; only now touch the output directory.
    let writer = OutputWriter::new(&config.output_dir);
    writer.write_all(&output)?;
    writer.write_json(SUMMARY_FILE, &summary)?;

    let (rows, columns) = output.combined_shape();
    let (daily_rows, daily_columns) = output.daily_shape();
    info!(
        combined_rows = rows,
        combined_columns = columns,
        daily_rows,
        daily_columns,
        "Data processing completed"
    );

    Ok(())
}
