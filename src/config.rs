//! Command-line arguments and the startup interval prompt.
//!
//! Every argument has a default that reproduces the plain interactive tool:
//! prompt for the interval, poll the CoinGecko markets listing for the top 50
//! coins and write `crypto_prices.xlsx` in the working directory.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::market_data::{MarketsRequest, COINGECKO_MARKETS_ADDRESS, DEFAULT_PER_PAGE};
use crate::report::{DEFAULT_PREVIEW_ROWS, DEFAULT_SHEET_NAME};

pub const DEFAULT_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_OUTPUT_STEM: &str = "crypto_prices";
pub const INTERVAL_PROMPT: &str = "Enter update interval in seconds (default 15): ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Polls cryptocurrency prices and keeps a spreadsheet snapshot up to date.")]
#[command(author, version, long_about = None)]
pub struct Args {
    /// Update interval in seconds. Asked for interactively when omitted.
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Output file (default: crypto_prices.xlsx, or .csv with --format csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Worksheet name.
    #[arg(long, default_value = DEFAULT_SHEET_NAME)]
    pub sheet: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
    pub format: OutputFormat,

    /// Rows shown in the console preview after each write.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub top: usize,

    /// Markets listing endpoint.
    #[arg(long, default_value = COINGECKO_MARKETS_ADDRESS)]
    pub endpoint: String,

    /// Coins per request, capped at 250.
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Request timeout. No timeout when omitted.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Replay recorded payloads (one JSON array per line) instead of calling the provider.
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Stop after this many cycles.
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackerConfig {
    pub interval: Duration,
    pub output: PathBuf,
    pub sheet_name: String,
    pub format: OutputFormat,
    pub top: usize,
    pub request: MarketsRequest,
    pub timeout: Option<Duration>,
    pub replay: Option<PathBuf>,
    pub max_cycles: Option<u64>,
}

impl TrackerConfig {
    /// Resolves `args`, prompting on `input`/`output` if no interval was given.
    pub fn from_args<R: BufRead, W: Write>(args: Args, input: R, output: W) -> io::Result<Self> {
        let interval_secs = match args.interval {
            Some(secs) => secs,
            None => prompt_interval(input, output)?,
        };
        let output = args.output.unwrap_or_else(|| {
            PathBuf::from(format!("{}.{}", DEFAULT_OUTPUT_STEM, args.format.extension()))
        });

        Ok(TrackerConfig {
            interval: Duration::from_secs(interval_secs),
            output,
            sheet_name: args.sheet,
            format: args.format,
            top: args.top,
            request: MarketsRequest::default()
                .with_endpoint(&args.endpoint)
                .with_per_page(args.per_page),
            timeout: args.timeout_secs.map(Duration::from_secs),
            replay: args.replay,
            max_cycles: args.max_cycles,
        })
    }
}

/// Interval from user input. Anything but a plain run of digits means the default.
pub fn parse_interval(input: &str) -> u64 {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_INTERVAL_SECS;
    }
    trimmed.parse().unwrap_or(DEFAULT_INTERVAL_SECS)
}

pub fn prompt_interval<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<u64> {
    write!(output, "{}", INTERVAL_PROMPT)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(parse_interval(&line))
}
