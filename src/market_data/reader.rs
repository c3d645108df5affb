use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};

use crate::base::QuoteTable;
use crate::error::{Result, TrackerError};
use super::api_parser;
use super::{MarketsRequest, QuoteSource};

/// Live provider client. One blocking GET per `fetch`, no retries.
pub struct MarketDataLive {
    agent: ureq::Agent,
    request: MarketsRequest,
}

impl MarketDataLive {
    /// With `None` a hung request blocks the caller indefinitely.
    pub fn new_with_timeout(request: MarketsRequest, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        MarketDataLive { agent: builder.build(), request }
    }
}

impl QuoteSource for MarketDataLive {
    fn fetch(&mut self) -> Result<QuoteTable> {
        info!("Fetching latest crypto data...");
        let mut call = self.agent.get(&self.request.endpoint);
        for (key, val) in self.request.query_pairs() {
            call = call.query(key, &val);
        }
        let resp = call.call()?;
        let body = resp.into_string()
            .map_err(|err| TrackerError::Transport(format!("failed to read response body: {}", err)))?;
        let quotes = api_parser::parse_markets(&body)?;
        if let Some(top) = quotes.first() {
            debug!("Received {} quotes, top: {}", quotes.len(), top);
        }
        Ok(quotes)
    }
}

/// Replays recorded provider payloads, one JSON array per line.
///
/// Once the file is exhausted the last snapshot is served again, so a replay
/// can drive the tracker for as long as the live client would.
pub struct MarketDataSimJson {
    path: PathBuf,
    data_reader: BufReader<File>,
    line_buffer: String,
    last_snapshot: Option<QuoteTable>,
}

impl MarketDataSimJson {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_file = File::open(path.as_ref())?;
        Ok(MarketDataSimJson {
            path: path.as_ref().to_path_buf(),
            data_reader: BufReader::new(data_file),
            line_buffer: String::new(),
            last_snapshot: None,
        })
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            self.line_buffer.clear();
            let bytes_read = self.data_reader.read_line(&mut self.line_buffer)
                .map_err(|err| TrackerError::Transport(format!("failed to read {}: {}", self.path.display(), err)))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            let line = self.line_buffer.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_owned()));
            }
        }
    }
}

impl QuoteSource for MarketDataSimJson {
    fn fetch(&mut self) -> Result<QuoteTable> {
        info!("Reading next snapshot from {}", self.path.display());
        match self.next_line()? {
            Some(line) => {
                let quotes = api_parser::parse_markets(&line)?;
                self.last_snapshot = Some(quotes.clone());
                Ok(quotes)
            }
            None => match &self.last_snapshot {
                Some(quotes) => {
                    warn!("Replay file {} exhausted, repeating last snapshot", self.path.display());
                    Ok(quotes.clone())
                }
                None => Err(TrackerError::Transport(format!("no payloads in {}", self.path.display()))),
            },
        }
    }
}
