//! The polling loop: fetch, report, wait, repeat.
//!
//! Each cycle is independent of the last. Errors from a cycle are logged and
//! the loop carries on after the normal wait. The loop ends on Ctrl+C during
//! the wait or when the optional cycle limit is reached. A Ctrl+C that lands
//! while a cycle is running, or a second one, asks the process to exit right
//! away, since a fetch without a timeout may never return.
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{error, info};

use crate::config::{OutputFormat, TrackerConfig};
use crate::error::{Result, TrackerError};
use crate::market_data::{MarketDataLive, MarketDataSimJson, QuoteSource};
use crate::report::{CsvSnapshotWriter, ReportOutcome, Reporter, SnapshotWriter, XlsxSnapshotWriter};

pub type DynTracker = Tracker<Box<dyn QuoteSource>, Box<dyn SnapshotWriter>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptAction {
    /// Loop will stop at the end of the current wait.
    Graceful,
    /// Caller should terminate the process now.
    Exit,
}

/// Shared between the signal handler thread and the polling loop.
pub struct Interrupt {
    tx: Sender<()>,
    rx: Receiver<()>,
    requested: AtomicBool,
    in_cycle: AtomicBool,
}

impl Interrupt {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(1);
        Interrupt { tx, rx, requested: AtomicBool::new(false), in_cycle: AtomicBool::new(false) }
    }

    /// Called from the Ctrl+C handler.
    pub fn handle(&self) -> InterruptAction {
        let already_requested = self.requested.swap(true, Ordering::SeqCst);
        if already_requested || self.in_cycle.load(Ordering::SeqCst) {
            return InterruptAction::Exit;
        }
        let _ = self.tx.try_send(());
        InterruptAction::Graceful
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn set_in_cycle(&self, in_cycle: bool) {
        self.in_cycle.store(in_cycle, Ordering::SeqCst);
    }

    /// Waits up to `timeout`; true if a graceful stop was requested.
    fn wait(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            // we hold a sender, so this only guards against a busy loop
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                false
            }
        }
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Interrupt::new()
    }
}

pub struct Tracker<S: QuoteSource, W: SnapshotWriter> {
    source: S,
    reporter: Reporter<W>,
    interval: Duration,
}

impl<S: QuoteSource, W: SnapshotWriter> Tracker<S, W> {
    pub fn new(source: S, reporter: Reporter<W>, interval: Duration) -> Self {
        Tracker { source, reporter, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    /// One fetch and, when anything came back, one write.
    ///
    /// A failed fetch never reaches the reporter, so the previous snapshot on
    /// disk stays as it was.
    pub fn run_cycle(&mut self) -> Result<ReportOutcome> {
        let quotes = self.source.fetch()?;
        self.reporter.report(&quotes)
    }

    /// Runs until `interrupt` asks for a stop or `max_cycles` is reached.
    /// Returns the number of cycles run.
    pub fn run(&mut self, interrupt: &Interrupt, max_cycles: Option<u64>) -> u64 {
        let mut cycles = 0;
        loop {
            interrupt.set_in_cycle(true);
            let result = self.run_cycle();
            interrupt.set_in_cycle(false);
            if let Err(err) = result {
                error!("Error {}: {}", cycle_error_context(&err), err);
            }
            cycles += 1;

            if max_cycles.map_or(false, |max| cycles >= max) {
                info!("Reached {} cycles, stopping tracker", cycles);
                break;
            }

            info!("Next update in {} seconds...", self.interval.as_secs());
            info!("{}", "=".repeat(50));
            if interrupt.is_requested() || interrupt.wait(self.interval) {
                info!("Stopping tracker...");
                break;
            }
        }
        cycles
    }
}

fn cycle_error_context(err: &TrackerError) -> &'static str {
    match err {
        TrackerError::Persistence(_) => "saving snapshot",
        // Io never leaves a cycle, it only comes from startup
        TrackerError::Transport(_) | TrackerError::Parse(_) | TrackerError::Io(_) => "fetching data",
    }
}

impl DynTracker {
    /// Picks the quote source and output writer named by `config`.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let source: Box<dyn QuoteSource> = match &config.replay {
            Some(path) => Box::new(MarketDataSimJson::new(path)?),
            None => Box::new(MarketDataLive::new_with_timeout(config.request.clone(), config.timeout)),
        };
        let writer: Box<dyn SnapshotWriter> = match config.format {
            OutputFormat::Xlsx => Box::new(XlsxSnapshotWriter::new(&config.output, &config.sheet_name)),
            OutputFormat::Csv => Box::new(CsvSnapshotWriter::new(&config.output)),
        };
        let reporter = Reporter::with_preview_rows(writer, config.top);
        Ok(Tracker::new(source, reporter, config.interval))
    }
}
