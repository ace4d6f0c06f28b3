use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::metadata::LevelFilter;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use collegedata_scraper::{resolve_range, run, write_csv, CancelFlag, Config};

#[derive(clap::Parser)]
#[clap(about = "Scrapes school profiles from CollegeData.com into one wide CSV")]
struct Args {
    /// First school identifier to scrape.
    #[clap(long)]
    start: Option<u32>,
    /// Last school identifier to scrape, inclusive. Without --start this
    /// scrapes 1 through the given identifier.
    #[clap(long)]
    end: Option<u32>,
    #[clap(long, default_value = "config.json")]
    config: PathBuf,
    /// Output CSV path, overriding the configured one.
    #[clap(long)]
    output: Option<PathBuf>,
    #[clap(short, long, help = "Suppress per-school progress logging")]
    silent: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load_or_default(&args.config)?;

    let error_log = File::create(&config.paths.error_log)
        .with_context(|| format!("creating {}", config.paths.error_log))?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(error_log);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(LevelFilter::from_level(Level::ERROR)),
        )
        .init();

    let range = resolve_range(&config, args.start, args.end)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.paths.output));

    info!(
        start = range.0,
        end = range.1,
        workers = config.workers,
        "starting scrape"
    );
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, draining in-flight schools");
        handler_flag.cancel();
    })
    .context("installing interrupt handler")?;
    let summary = run(&config, range, args.silent, &cancel)?;

    // Failures are per-school; whatever was scraped still gets written.
    write_csv(&summary.records, &output)?;
    info!(
        records = summary.records.len(),
        skipped = summary.skipped,
        failures = summary.failures.len(),
        "finished"
    );
    if !summary.failures.is_empty() {
        warn!(
            "{} school(s) failed, details in {}",
            summary.failures.len(),
            config.paths.error_log
        );
    }
    Ok(())
}
