use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trcara::config::load_config;
use trcara::model::SourceKind;
use trcara::pipeline::run;

#[derive(Parser, Debug)]
#[command(
    name = "trcara",
    version,
    about = "Collects new race listings into a tab-separated file for review"
)]
struct Cli {
    /// TOML file overriding the built-in sources and filters.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    output: Option<PathBuf>,

    /// Drop events dated before this day (yyyy-mm-dd).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only scrape these sources: itra, trka, runtrace.
    #[arg(long = "source")]
    sources: Vec<String>,

    /// CSV export URL or local file with the races already listed.
    #[arg(long)]
    known_races: Option<String>,

    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output_path = Some(output);
    }
    if let Some(from) = cli.from {
        config.filter_date_from = from;
    }
    if let Some(known_races) = cli.known_races {
        config.known_races_url = known_races;
    }
    let sources = cli
        .sources
        .iter()
        .map(|s| s.parse::<SourceKind>())
        .collect::<Result<Vec<_>>>()?;
    config.restrict_sources(&sources);
    config.validate().context("invalid configuration")?;

    info!(version = env!("CARGO_PKG_VERSION"), "trcara starting");
    let report = run(&config)?;

    for source in &report.sources {
        info!(
            source = %source.source,
            parsed = source.parsed,
            retained = source.retained,
            failed = source.failed.as_deref().unwrap_or("-"),
            "source summary"
        );
    }
    info!(
        events = report.events_written,
        similar = report.similar.len(),
        path = %report.output_path.display(),
        "run complete"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
