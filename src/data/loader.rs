//! CSV loading for the monthly indicator history
//!
//! Rows are read, sorted by month and cleaned. Every dropped row is recorded
//! in a [`CleaningReport`] rather than silently discarded.

use chrono::NaiveDate;
use log::{info, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::dates::parse_month;
use super::record::{HistoricalDataset, HistoricalRecord};
use crate::error::{NowcastError, Result};

pub const COL_DATE: &str = "Year";
pub const COL_EXCHANGE_RATE_GROWTH: &str = "Exchange Rate Growth";
pub const COL_GLOBAL_INFLATION: &str = "Global Inflation";
pub const COL_EGYPT_INFLATION: &str = "Egypt Inflation";
pub const COL_EGYPT_LAG1: &str = "Egypt Inflation Lag1";
pub const COL_EGYPT_LAG2: &str = "Egypt Inflation Lag2";
pub const COL_GLOBAL_LAG1: &str = "Global Inflation Lag1";
pub const COL_GLOBAL_LAG2: &str = "Global Inflation Lag2";

/// Columns that must be present in the header
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_DATE,
    COL_EXCHANGE_RATE_GROWTH,
    COL_GLOBAL_INFLATION,
    COL_EGYPT_INFLATION,
    COL_EGYPT_LAG1,
    COL_EGYPT_LAG2,
    COL_GLOBAL_LAG1,
    COL_GLOBAL_LAG2,
];

/// Raw row as it appears in the sheet export; blanks and junk become `None`
#[derive(Debug, Deserialize)]
struct RawHistoryRow {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Exchange Rate Growth", deserialize_with = "csv::invalid_option")]
    exchange_rate_growth: Option<f64>,
    #[serde(rename = "Global Inflation", deserialize_with = "csv::invalid_option")]
    global_inflation: Option<f64>,
    #[serde(rename = "Egypt Inflation", deserialize_with = "csv::invalid_option")]
    egypt_inflation: Option<f64>,
    #[serde(rename = "Egypt Inflation Lag1", deserialize_with = "csv::invalid_option")]
    egypt_inflation_lag1: Option<f64>,
    #[serde(rename = "Egypt Inflation Lag2", deserialize_with = "csv::invalid_option")]
    egypt_inflation_lag2: Option<f64>,
    #[serde(rename = "Global Inflation Lag1", deserialize_with = "csv::invalid_option")]
    global_inflation_lag1: Option<f64>,
    #[serde(rename = "Global Inflation Lag2", deserialize_with = "csv::invalid_option")]
    global_inflation_lag2: Option<f64>,
}

/// Why a row was excluded from the cleaned history
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// The `Year` cell could not be read as a month (or, for annual sheets, a whole year)
    BadDate(String),
    /// A required numeric cell was blank, NaN or unparseable
    MissingValue(&'static str),
    /// Another row already covers the same period; annual rows are keyed by 1 January
    DuplicateDate(NaiveDate),
}

/// A dropped row and its 1-based line number in the source file
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub line: u64,
    pub reason: DropReason,
}

/// Summary of what cleaning did to the raw rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped: Vec<DroppedRow>,
}

impl CleaningReport {
    pub fn bad_dates(&self) -> usize {
        self.dropped.iter().filter(|d| matches!(d.reason, DropReason::BadDate(_))).count()
    }

    pub fn missing_values(&self) -> usize {
        self.dropped.iter().filter(|d| matches!(d.reason, DropReason::MissingValue(_))).count()
    }

    pub fn duplicates(&self) -> usize {
        self.dropped.iter().filter(|d| matches!(d.reason, DropReason::DuplicateDate(_))).count()
    }

    /// One-line description for logs and CLI output
    pub fn summary(&self) -> String {
        format!(
            "{} rows read, {} kept, {} dropped ({} bad date, {} missing value, {} duplicate period)",
            self.rows_read,
            self.rows_kept,
            self.dropped.len(),
            self.bad_dates(),
            self.missing_values(),
            self.duplicates(),
        )
    }
}

/// Load the indicator history from a CSV file
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<(HistoricalDataset, CleaningReport)> {
    let path = path.as_ref();
    info!("Loading indicator history from {}", path.display());
    let file = File::open(path)?;
    load_history_from_reader(file)
}

/// Load the indicator history from any reader producing CSV text
pub fn load_history_from_reader<R: Read>(reader: R) -> Result<(HistoricalDataset, CleaningReport)> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(NowcastError::InvalidInput(format!(
            "history is missing columns: {}",
            missing.join(", ")
        )));
    }

    let mut report = CleaningReport::default();
    let mut candidates: Vec<(u64, HistoricalRecord)> = Vec::new();

    for result in rdr.records() {
        let row = result?;
        report.rows_read += 1;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawHistoryRow = row.deserialize(Some(&headers))?;

        match clean_row(&raw) {
            Ok(record) => candidates.push((line, record)),
            Err(reason) => report.dropped.push(DroppedRow { line, reason }),
        }
    }

    // Stable sort keeps file order among rows for the same month
    candidates.sort_by_key(|(_, record)| record.date);

    let mut records: Vec<HistoricalRecord> = Vec::with_capacity(candidates.len());
    for (line, record) in candidates {
        if records.last().is_some_and(|prev| prev.date == record.date) {
            report.dropped.push(DroppedRow { line, reason: DropReason::DuplicateDate(record.date) });
            continue;
        }
        records.push(record);
    }

    report.dropped.sort_by_key(|d| d.line);
    report.rows_kept = records.len();

    if !report.dropped.is_empty() {
        warn!("History cleaning: {}", report.summary());
    }
    info!("Loaded {} monthly records", records.len());

    let dataset = HistoricalDataset::new(records)?;
    Ok((dataset, report))
}

fn clean_row(raw: &RawHistoryRow) -> std::result::Result<HistoricalRecord, DropReason> {
    let date = parse_month(&raw.year).ok_or_else(|| DropReason::BadDate(raw.year.clone()))?;

    let value = |v: Option<f64>, column: &'static str| match v {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(DropReason::MissingValue(column)),
    };

    Ok(HistoricalRecord {
        date,
        exchange_rate_growth: value(raw.exchange_rate_growth, COL_EXCHANGE_RATE_GROWTH)?,
        global_inflation: value(raw.global_inflation, COL_GLOBAL_INFLATION)?,
        egypt_inflation: value(raw.egypt_inflation, COL_EGYPT_INFLATION)?,
        egypt_inflation_lag1: value(raw.egypt_inflation_lag1, COL_EGYPT_LAG1)?,
        egypt_inflation_lag2: value(raw.egypt_inflation_lag2, COL_EGYPT_LAG2)?,
        global_inflation_lag1: value(raw.global_inflation_lag1, COL_GLOBAL_LAG1)?,
        global_inflation_lag2: value(raw.global_inflation_lag2, COL_GLOBAL_LAG2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Year,Exchange Rate Growth,Global Inflation,Egypt Inflation,Egypt Inflation Lag1,Egypt Inflation Lag2,Global Inflation Lag1,Global Inflation Lag2\n";

    #[test]
    fn test_load_sorts_and_keeps_complete_rows() {
        let csv = format!(
            "{HEADER}\
             01/02/2024,1.0,3.1,11.0,10.0,9.0,3.0,2.9\n\
             01/01/2024,0.5,3.0,10.0,9.0,8.0,2.9,2.8\n"
        );
        let (ds, report) = load_history_from_reader(Cursor::new(csv)).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(ds.last().unwrap().egypt_inflation, 11.0);
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_kept, 2);
        assert!(report.dropped.is_empty());
    }

    #[test]
    fn test_cleaning_report_lists_every_drop() {
        let csv = format!(
            "{HEADER}\
             01/01/2024,0.5,3.0,10.0,9.0,8.0,2.9,2.8\n\
             01/02/2024,1.0,3.1,,10.0,9.0,3.0,2.9\n\
             garbage,1.0,3.1,11.0,10.0,9.0,3.0,2.9\n\
             01/03/2024,1.0,NaN,11.0,10.0,9.0,3.0,2.9\n\
             15/01/2024,0.7,3.0,10.5,9.0,8.0,2.9,2.8\n"
        );
        let (ds, report) = load_history_from_reader(Cursor::new(csv)).unwrap();

        assert_eq!(ds.len(), 1);
        assert_eq!(report.rows_read, 5);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.missing_values(), 2);
        assert_eq!(report.bad_dates(), 1);
        assert_eq!(report.duplicates(), 1);

        // Lines are 1-based and include the header
        assert_eq!(report.dropped[0].line, 3);
        assert_eq!(report.dropped[0].reason, DropReason::MissingValue(COL_EGYPT_INFLATION));
        assert_eq!(report.dropped[1].reason, DropReason::BadDate("garbage".to_string()));
        assert_eq!(report.dropped[2].reason, DropReason::MissingValue(COL_GLOBAL_INFLATION));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "Year,Global Inflation,Egypt Inflation\n01/01/2024,3.0,10.0\n";
        let err = load_history_from_reader(Cursor::new(csv)).unwrap_err();
        match err {
            NowcastError::InvalidInput(msg) => assert!(msg.contains("Exchange Rate Growth")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "Notes,Year,Exchange Rate Growth,Global Inflation,Egypt Inflation,Egypt Inflation Lag1,Egypt Inflation Lag2,Global Inflation Lag1,Global Inflation Lag2\n\
                   x,2024-01-01,0.5,3.0,10.0,9.0,8.0,2.9,2.8\n";
        let (ds, _) = load_history_from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(ds.len(), 1);
    }
}
