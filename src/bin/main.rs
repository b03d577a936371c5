use std::fs::File;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use opal_export::{write_report, year_months, Aggregator, Config};

/// A cli interface to the smartcard activity exporter
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// Base URL of the fare API
    #[clap(long, env = "OPAL_API_DOMAIN", default_value = "https://transportnsw.info")]
    domain: String,
    /// Bearer token for the fare API
    #[clap(long, env = "OPAL_BEARER_TOKEN", hide_env_values = true)]
    token: String,
    /// First year to aggregate (inclusive)
    #[clap(long, default_value_t = 2018)]
    start_year: i32,
    /// Last year to aggregate (exclusive)
    #[clap(long, default_value_t = 2025)]
    end_year: i32,
    /// Records requested per activity page
    #[clap(long, default_value_t = 500)]
    page_size: usize,
    /// Pause between activity requests, in milliseconds
    #[clap(long, default_value_t = 100)]
    delay_ms: u64,
    /// The path of the report file, overwritten if it exists
    #[clap(long, default_value = "activity.csv")]
    output: std::path::PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config {
        domain: args.domain,
        token: args.token,
        start_year: args.start_year,
        end_year: args.end_year,
        page_size: args.page_size,
        pacing: Duration::from_millis(args.delay_ms),
    };

    println!("Starting...");

    let aggregator = Aggregator::new(config.clone())?;
    let cards = aggregator.run()?;

    let file = File::create(&args.output)?;
    write_report(file, &cards, year_months(config.start_year, config.end_year))?;

    println!("Complete!");

    Ok(())
}
