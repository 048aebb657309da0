//! Historical series shown by the explorer page
//!
//! Two sheets: monthly global and domestic inflation, and annual subsidies,
//! food imports and net international reserves. Both are sorted by period,
//! cleaned into a [`CleaningReport`] and rounded to two decimals for display.

use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::dates::{parse_month, parse_year, year_start};
use super::loader::{CleaningReport, DropReason, DroppedRow, COL_DATE, COL_EGYPT_INFLATION, COL_GLOBAL_INFLATION};
use crate::error::{NowcastError, Result};

pub const COL_SUBSIDIES: &str = "Subsidies";
pub const COL_FOOD_IMPORTS: &str = "Food Imports";
pub const COL_NIR: &str = "NIR";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InflationPoint {
    pub date: NaiveDate,
    pub global_inflation: f64,
    pub egypt_inflation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiscalPoint {
    pub year: i32,
    pub subsidies: f64,
    pub food_imports: f64,
    /// Net international reserves
    pub nir: f64,
}

#[derive(Debug, Deserialize)]
struct RawInflationRow {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Global Inflation", deserialize_with = "csv::invalid_option")]
    global_inflation: Option<f64>,
    #[serde(rename = "Egypt Inflation", deserialize_with = "csv::invalid_option")]
    egypt_inflation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawFiscalRow {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Subsidies", deserialize_with = "csv::invalid_option")]
    subsidies: Option<f64>,
    #[serde(rename = "Food Imports", deserialize_with = "csv::invalid_option")]
    food_imports: Option<f64>,
    #[serde(rename = "NIR", deserialize_with = "csv::invalid_option")]
    nir: Option<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn required(v: Option<f64>, column: &'static str) -> std::result::Result<f64, DropReason> {
    match v {
        Some(x) if x.is_finite() => Ok(round2(x)),
        _ => Err(DropReason::MissingValue(column)),
    }
}

fn check_columns(headers: &csv::StringRecord, columns: &[&str], sheet: &str) -> Result<()> {
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NowcastError::InvalidInput(format!("{sheet} is missing columns: {}", missing.join(", "))))
    }
}

/// Sort candidates by period, keep the first row per period and finish the report
fn dedup_by_period<T>(
    mut candidates: Vec<(u64, NaiveDate, T)>,
    report: &mut CleaningReport,
) -> Vec<T> {
    candidates.sort_by_key(|(_, date, _)| *date);

    let mut kept: Vec<T> = Vec::with_capacity(candidates.len());
    let mut last: Option<NaiveDate> = None;
    for (line, date, point) in candidates {
        if last == Some(date) {
            report.dropped.push(DroppedRow { line, reason: DropReason::DuplicateDate(date) });
            continue;
        }
        last = Some(date);
        kept.push(point);
    }

    report.dropped.sort_by_key(|d| d.line);
    report.rows_kept = kept.len();
    kept
}

pub fn load_inflation_series<P: AsRef<Path>>(path: P) -> Result<(Vec<InflationPoint>, CleaningReport)> {
    let path = path.as_ref();
    info!("Loading inflation series from {}", path.display());
    load_inflation_series_from_reader(File::open(path)?)
}

pub fn load_inflation_series_from_reader<R: Read>(reader: R) -> Result<(Vec<InflationPoint>, CleaningReport)> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    check_columns(&headers, &[COL_DATE, COL_GLOBAL_INFLATION, COL_EGYPT_INFLATION], "inflation series")?;

    let mut report = CleaningReport::default();
    let mut candidates = Vec::new();
    for result in rdr.records() {
        let row = result?;
        report.rows_read += 1;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawInflationRow = row.deserialize(Some(&headers))?;

        let point = parse_month(&raw.year)
            .ok_or_else(|| DropReason::BadDate(raw.year.clone()))
            .and_then(|date| {
                Ok(InflationPoint {
                    date,
                    global_inflation: required(raw.global_inflation, COL_GLOBAL_INFLATION)?,
                    egypt_inflation: required(raw.egypt_inflation, COL_EGYPT_INFLATION)?,
                })
            });
        match point {
            Ok(p) => candidates.push((line, p.date, p)),
            Err(reason) => report.dropped.push(DroppedRow { line, reason }),
        }
    }

    let points = dedup_by_period(candidates, &mut report);
    if !report.dropped.is_empty() {
        warn!("Inflation series cleaning: {}", report.summary());
    }
    Ok((points, report))
}

pub fn load_fiscal_series<P: AsRef<Path>>(path: P) -> Result<(Vec<FiscalPoint>, CleaningReport)> {
    let path = path.as_ref();
    info!("Loading subsidies, imports and NIR from {}", path.display());
    load_fiscal_series_from_reader(File::open(path)?)
}

/// Annual rows; `Year` must be a whole calendar year
pub fn load_fiscal_series_from_reader<R: Read>(reader: R) -> Result<(Vec<FiscalPoint>, CleaningReport)> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    check_columns(&headers, &[COL_DATE, COL_SUBSIDIES, COL_FOOD_IMPORTS, COL_NIR], "fiscal series")?;

    let mut report = CleaningReport::default();
    let mut candidates = Vec::new();
    for result in rdr.records() {
        let row = result?;
        report.rows_read += 1;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let raw: RawFiscalRow = row.deserialize(Some(&headers))?;

        let point = parse_year(&raw.year)
            .and_then(year_start)
            .ok_or_else(|| DropReason::BadDate(raw.year.clone()))
            .and_then(|start| {
                Ok((
                    start,
                    FiscalPoint {
                        year: start.year(),
                        subsidies: required(raw.subsidies, COL_SUBSIDIES)?,
                        food_imports: required(raw.food_imports, COL_FOOD_IMPORTS)?,
                        nir: required(raw.nir, COL_NIR)?,
                    },
                ))
            });
        match point {
            Ok((start, p)) => candidates.push((line, start, p)),
            Err(reason) => report.dropped.push(DroppedRow { line, reason }),
        }
    }

    let points = dedup_by_period(candidates, &mut report);
    if !report.dropped.is_empty() {
        warn!("Fiscal series cleaning: {}", report.summary());
    }
    Ok((points, report))
}
