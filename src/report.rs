use std::path::PathBuf;

use chrono::{DateTime, Local};
use log::{debug, info};
use serde::Serialize;

use crate::base::{round_cents, AssetQuote};
use crate::error::Result;

pub mod writer;

pub use writer::{CsvSnapshotWriter, SnapshotWriter, XlsxSnapshotWriter};

/// Display headers, in sheet order.
pub const COLUMNS: [&str; 6] = ["Name", "Symbol", "Price (USD)", "Market Cap", "24h Volume", "24h Change %"];
pub const DEFAULT_SHEET_NAME: &str = "Live Data";
pub const DEFAULT_PREVIEW_ROWS: usize = 3;
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MISSING_CELL: &str = "n/a";

/// One output row. Field names double as csv headers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Price (USD)")]
    pub price_usd: Option<f64>,
    #[serde(rename = "Market Cap")]
    pub market_cap: Option<f64>,
    #[serde(rename = "24h Volume")]
    pub volume_24h: Option<f64>,
    #[serde(rename = "24h Change %")]
    pub change_24h_pct: Option<f64>,
}

impl From<&AssetQuote> for SnapshotRow {
    fn from(quote: &AssetQuote) -> Self {
        SnapshotRow {
            name: quote.name.clone(),
            symbol: quote.symbol.clone(),
            price_usd: quote.current_price.map(round_cents),
            market_cap: quote.market_cap,
            volume_24h: quote.total_volume,
            change_24h_pct: quote.price_change_percentage_24h.map(round_cents),
        }
    }
}

/// Transformed snapshot, laid out as it appears in the sheet.
///
/// Row 0 is the header, data occupies rows `1..=len`, one blank row follows,
/// then the timestamp block: its `Name` header at `len + 2` and the
/// `Last Updated` cell at `len + 3`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapshotTable {
    pub rows: Vec<SnapshotRow>,
}

impl SnapshotTable {
    pub fn from_quotes(quotes: &[AssetQuote]) -> Self {
        SnapshotTable { rows: quotes.iter().map(SnapshotRow::from).collect() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamp_block_row(&self) -> u32 {
        self.rows.len() as u32 + 2
    }

    pub fn timestamp_row(&self) -> u32 {
        self.timestamp_block_row() + 1
    }

    /// Text table of `Name`, `Price (USD)` and `24h Change %` for the first
    /// `top` rows, with a leading row index column.
    pub fn preview(&self, top: usize) -> String {
        let headers = ["", COLUMNS[0], COLUMNS[2], COLUMNS[5]];
        let cells: Vec<[String; 4]> = self.rows.iter()
            .take(top)
            .enumerate()
            .map(|(idx, row)| [
                idx.to_string(),
                row.name.clone(),
                format_cents(row.price_usd),
                format_cents(row.change_24h_pct),
            ])
            .collect();

        let mut widths = headers.map(str::len);
        for line in &cells {
            for (width, cell) in widths.iter_mut().zip(line.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = Vec::with_capacity(cells.len() + 1);
        out.push(align_line(&headers, &widths));
        for line in &cells {
            let line: Vec<&str> = line.iter().map(String::as_str).collect();
            out.push(align_line(&line, &widths));
        }
        out.join("\n")
    }
}

fn format_cents(val: Option<f64>) -> String {
    match val {
        Some(v) => format!("{:.2}", v),
        None => MISSING_CELL.to_owned(),
    }
}

fn align_line(cells: &[&str], widths: &[usize]) -> String {
    cells.iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn timestamp_label(now: &DateTime<Local>) -> String {
    format!("Last Updated: {}", now.format(TIMESTAMP_FORMAT))
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReportOutcome {
    /// Nothing fetched, output file left alone.
    Skipped,
    Written { rows: usize, path: PathBuf },
}

pub struct Reporter<W: SnapshotWriter> {
    writer: W,
    top: usize,
}

impl<W: SnapshotWriter> Reporter<W> {
    pub fn new(writer: W) -> Self {
        Reporter::with_preview_rows(writer, DEFAULT_PREVIEW_ROWS)
    }

    pub fn with_preview_rows(writer: W, top: usize) -> Self {
        Reporter { writer, top }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn report(&mut self, quotes: &[AssetQuote]) -> Result<ReportOutcome> {
        let table = SnapshotTable::from_quotes(quotes);
        if table.is_empty() {
            debug!("No quotes this cycle, skipping write");
            return Ok(ReportOutcome::Skipped);
        }

        let now = Local::now();
        self.writer.write_snapshot(&table, &timestamp_label(&now))?;

        let path = self.writer.output_path().to_path_buf();
        info!("{} updated at {}", path.display(), now.format("%H:%M:%S"));
        if self.top > 0 {
            println!("\nTop {} cryptocurrencies:", self.top.min(table.len()));
            println!("{}", table.preview(self.top));
        }
        Ok(ReportOutcome::Written { rows: table.len(), path })
    }
}
