use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

use crate::error::{Result, TrackerError};
use super::{SnapshotTable, COLUMNS};

/// Persists one snapshot, replacing whatever the output held before.
pub trait SnapshotWriter {
    fn write_snapshot(&mut self, table: &SnapshotTable, timestamp_label: &str) -> Result<()>;

    fn output_path(&self) -> &Path;
}

impl<W: SnapshotWriter + ?Sized> SnapshotWriter for Box<W> {
    fn write_snapshot(&mut self, table: &SnapshotTable, timestamp_label: &str) -> Result<()> {
        (**self).write_snapshot(table, timestamp_label)
    }

    fn output_path(&self) -> &Path {
        (**self).output_path()
    }
}

pub struct XlsxSnapshotWriter {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxSnapshotWriter {
    pub fn new<P: AsRef<Path>>(path: P, sheet_name: &str) -> Self {
        XlsxSnapshotWriter { path: path.as_ref().to_path_buf(), sheet_name: sheet_name.to_owned() }
    }
}

fn write_number(worksheet: &mut Worksheet, row: u32, col: u16, val: Option<f64>) -> Result<()> {
    // Excel has no NaN or infinity, those cells stay blank like missing values
    if let Some(v) = val.filter(|v| v.is_finite()) {
        worksheet.write_number(row, col, v)?;
    }
    Ok(())
}

impl SnapshotWriter for XlsxSnapshotWriter {
    fn write_snapshot(&mut self, table: &SnapshotTable, timestamp_label: &str) -> Result<()> {
        let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
        let mut workbook = Workbook::new();
        {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(self.sheet_name.as_str())?;

            for (col, header) in COLUMNS.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
            }

            for (idx, row) in table.rows.iter().enumerate() {
                let row_num = idx as u32 + 1;
                worksheet.write_string(row_num, 0, row.name.as_str())?;
                worksheet.write_string(row_num, 1, row.symbol.as_str())?;
                write_number(worksheet, row_num, 2, row.price_usd)?;
                write_number(worksheet, row_num, 3, row.market_cap)?;
                write_number(worksheet, row_num, 4, row.volume_24h)?;
                write_number(worksheet, row_num, 5, row.change_24h_pct)?;
            }

            worksheet.write_string_with_format(table.timestamp_block_row(), 0, COLUMNS[0], &header_format)?;
            worksheet.write_string(table.timestamp_row(), 0, timestamp_label)?;
            worksheet.autofit();
        }
        workbook.save(&self.path)?;
        Ok(())
    }

    fn output_path(&self) -> &Path {
        &self.path
    }
}

/// Same row layout as the workbook, as plain csv.
pub struct CsvSnapshotWriter {
    path: PathBuf,
}

impl CsvSnapshotWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSnapshotWriter { path: path.as_ref().to_path_buf() }
    }
}

impl SnapshotWriter for CsvSnapshotWriter {
    fn write_snapshot(&mut self, table: &SnapshotTable, timestamp_label: &str) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;

        let blank = [""; COLUMNS.len()];
        let mut block_header = blank;
        block_header[0] = COLUMNS[0];
        let mut stamp = blank;
        stamp[0] = timestamp_label;

        csv_writer.write_record(COLUMNS)?;
        for row in &table.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.write_record(blank)?;
        csv_writer.write_record(block_header)?;
        csv_writer.write_record(stamp)?;
        csv_writer.flush()
            .map_err(|err| TrackerError::Persistence(format!("failed to flush {}: {}", self.path.display(), err)))
    }

    fn output_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use calamine::{open_workbook, Data, Reader, Xlsx};

    use super::*;
    use crate::base::AssetQuote;
    use crate::report::DEFAULT_SHEET_NAME;

    const STAMP: &str = "Last Updated: 2024-05-01 12:00:00";

    fn table_of(k: usize) -> SnapshotTable {
        let quotes: Vec<AssetQuote> = (0..k)
            .map(|i| AssetQuote::new(&format!("Coin{}", i), "c", 10.0 + i as f64, 1e9, 1e8, 0.5))
            .collect();
        SnapshotTable::from_quotes(&quotes)
    }

    fn cell_string(val: Option<&Data>) -> Option<String> {
        match val {
            Some(Data::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_xlsx_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_prices.xlsx");
        let table = SnapshotTable::from_quotes(&[
            AssetQuote::new("Bitcoin", "btc", 50000.125, 9.8e11, 2.5e10, 2.375),
            AssetQuote::new("Ethereum", "eth", 3101.2, 3.7e11, 1.1e10, -1.125),
            AssetQuote::new("Tether", "usdt", 1.0004, 1.1e11, 4.2e10, 0.01),
        ]);
        XlsxSnapshotWriter::new(&path, DEFAULT_SHEET_NAME).write_snapshot(&table, STAMP).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![DEFAULT_SHEET_NAME.to_owned()]);
        let range = workbook.worksheet_range(DEFAULT_SHEET_NAME).unwrap();

        for (col, header) in COLUMNS.iter().enumerate() {
            assert_eq!(cell_string(range.get_value((0, col as u32))).as_deref(), Some(*header));
        }
        assert_eq!(cell_string(range.get_value((1, 0))).as_deref(), Some("Bitcoin"));
        assert_eq!(cell_string(range.get_value((1, 1))).as_deref(), Some("btc"));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(50000.12)));
        assert_eq!(range.get_value((1, 3)), Some(&Data::Float(9.8e11)));
        assert_eq!(range.get_value((1, 5)), Some(&Data::Float(2.38)));
        assert_eq!(range.get_value((2, 5)), Some(&Data::Float(-1.12)));
        assert_eq!(range.get_value((3, 2)), Some(&Data::Float(1.0)));
        assert_eq!(cell_string(range.get_value((5, 0))).as_deref(), Some("Name"));
        assert_eq!(cell_string(range.get_value((6, 0))).as_deref(), Some(STAMP));
    }

    #[test]
    fn test_xlsx_timestamp_block_for_any_size() {
        let dir = tempfile::tempdir().unwrap();
        for k in [0usize, 1, 50] {
            let path = dir.path().join(format!("snapshot_{}.xlsx", k));
            XlsxSnapshotWriter::new(&path, DEFAULT_SHEET_NAME).write_snapshot(&table_of(k), STAMP).unwrap();

            let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
            let range = workbook.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
            let k = k as u32;
            if k > 0 {
                assert_eq!(cell_string(range.get_value((k, 0))), Some(format!("Coin{}", k - 1)));
            }
            assert!(matches!(range.get_value((k + 1, 0)), None | Some(Data::Empty)));
            assert_eq!(cell_string(range.get_value((k + 2, 0))).as_deref(), Some("Name"));
            assert_eq!(cell_string(range.get_value((k + 3, 0))).as_deref(), Some(STAMP));
        }
    }

    #[test]
    fn test_xlsx_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_prices.xlsx");
        let mut writer = XlsxSnapshotWriter::new(&path, DEFAULT_SHEET_NAME);
        writer.write_snapshot(&table_of(50), STAMP).unwrap();
        writer.write_snapshot(&table_of(1), STAMP).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
        assert_eq!(range.end(), Some((4, 5)));
    }

    #[test]
    fn test_xlsx_missing_values_are_blank() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_prices.xlsx");
        let mut quote = AssetQuote::new("Fresh", "new", 0.5, 1.0, 1.0, 0.0);
        quote.market_cap = None;
        quote.total_volume = Some(f64::NAN);
        XlsxSnapshotWriter::new(&path, DEFAULT_SHEET_NAME)
            .write_snapshot(&SnapshotTable::from_quotes(&[quote]), STAMP).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range(DEFAULT_SHEET_NAME).unwrap();
        assert!(matches!(range.get_value((1, 3)), None | Some(Data::Empty)));
        assert!(matches!(range.get_value((1, 4)), None | Some(Data::Empty)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(0.5)));
    }

    #[test]
    fn test_xlsx_bad_sheet_name_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_prices.xlsx");
        let result = XlsxSnapshotWriter::new(&path, "Live/Data").write_snapshot(&table_of(1), STAMP);
        assert!(matches!(result, Err(TrackerError::Persistence(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_xlsx_unwritable_path_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("crypto_prices.xlsx");
        let result = XlsxSnapshotWriter::new(&path, DEFAULT_SHEET_NAME).write_snapshot(&table_of(1), STAMP);
        assert!(matches!(result, Err(TrackerError::Persistence(_))));
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_prices.csv");
        let mut quote = AssetQuote::new("Bitcoin", "btc", 50000.125, 9.8e11, 2.5e10, 2.375);
        quote.total_volume = None;
        CsvSnapshotWriter::new(&path).write_snapshot(&SnapshotTable::from_quotes(&[quote]), STAMP).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Name,Symbol,Price (USD),Market Cap,24h Volume,24h Change %");
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[..3], ["Bitcoin", "btc", "50000.12"]);
        assert_eq!(fields[3].parse::<f64>().unwrap(), 9.8e11);
        assert_eq!(fields[4..], ["", "2.38"]);
        assert_eq!(lines[2..], [",,,,,", "Name,,,,,", "Last Updated: 2024-05-01 12:00:00,,,,,"]);
    }

    #[test]
    fn test_csv_unwritable_path_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("crypto_prices.csv");
        let result = CsvSnapshotWriter::new(&path).write_snapshot(&table_of(1), STAMP);
        assert!(matches!(result, Err(TrackerError::Persistence(_))));
    }
}
