use std::io;
use std::process::{self, ExitCode};
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use crypto_tracker::config::{Args, TrackerConfig};
use crypto_tracker::tracker::{DynTracker, Interrupt, InterruptAction};

fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    println!("=== Cryptocurrency Price Tracker ===");
    let config = match TrackerConfig::from_args(args, io::stdin().lock(), io::stdout()) {
        Ok(config) => config,
        Err(err) => {
            error!("Unable to read update interval: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut tracker = match DynTracker::from_config(&config) {
        Ok(tracker) => tracker,
        Err(err) => {
            error!("Unable to start tracker: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let interrupt = Arc::new(Interrupt::new());
    let handler_interrupt = interrupt.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        if handler_interrupt.handle() == InterruptAction::Exit {
            info!("Stopping tracker...");
            process::exit(0);
        }
    }) {
        error!("Unable to install Ctrl+C handler: {}", err);
        return ExitCode::FAILURE;
    }

    info!("Tracker started! Updates every {} seconds", config.interval.as_secs());
    info!("Snapshot will be saved as '{}'", config.output.display());
    info!("Press Ctrl+C to stop");

    let cycles = tracker.run(&interrupt, config.max_cycles);
    info!("Finished after {} cycles", cycles);
    ExitCode::SUCCESS
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stdout)
        .parse_default_env()
        .init();
}
