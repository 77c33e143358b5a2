use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use vsynctrack::config::EstimatorConfig;
use vsynctrack::estimator::RefreshEstimator;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File with one presentation timestamp (fractional ms) per line;
    /// reads stdin when omitted
    input: Option<PathBuf>,

    /// JSON file overriding the estimator tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log a status line every N timestamps (0 disables)
    #[arg(long, default_value_t = 5000)]
    log_every: u64,
}

fn main() -> Result<()> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config {}", path.display()))?;
            serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => EstimatorConfig::default(),
    };

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            info!("Reading timestamps from {}", path.display());
            Box::new(BufReader::new(file))
        }
        None => {
            info!("Reading timestamps from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let mut estimator = RefreshEstimator::new(config);
    let mut line_no: u64 = 0;

    for line in reader.lines() {
        let line = line.context("Failed to read input line")?;
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match trimmed.parse::<f64>() {
            Ok(ts) => estimator.count_cycle(ts),
            Err(_) => {
                warn!("Line {}: not a timestamp: {:?}", line_no, trimmed);
                continue;
            }
        }
        if args.log_every > 0 && estimator.cycle_count() % args.log_every == 0 {
            let status = estimator.status();
            info!(
                "Cycles {}: {:.4}Hz ({} stored, {} resets)",
                status.cycles_seen, status.frequency_hz, status.stored_samples, status.resets
            );
        }
    }

    let status = estimator.status();
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
