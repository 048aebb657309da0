//! Decomposition of annual domestic food-price change into driver contributions
//!
//! Each year's contributions are split into negative and non-negative parts
//! and stacked outward from zero in a fixed category order, which is how the
//! relative bar layout is built.

use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::data::dates::{parse_year, year_start};
use crate::data::{CleaningReport, DropReason, DroppedRow};
use crate::error::{NowcastError, Result};

/// Stacking order; categories missing from the sheet are skipped
pub const CATEGORY_ORDER: [&str; 6] = [
    "World Food Price (increase)",
    "World Food Price (decrease)",
    "Exchange Rate (depreciation)",
    "Exchange Rate (appreciation)",
    "Other Factors",
    "Unexplained (residuals)",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub category: &'static str,
    pub value: f64,
}

/// One year of contributions in [`CATEGORY_ORDER`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub year: i32,
    pub contributions: Vec<Contribution>,
}

/// A bar segment starting at `base` and extending by `value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub category: &'static str,
    pub value: f64,
    pub base: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Stacked {
    pub negative: Vec<Segment>,
    pub positive: Vec<Segment>,
}

impl Breakdown {
    pub fn stacked(&self) -> Stacked {
        let mut stacked = Stacked::default();
        let mut neg_base = 0.0;
        let mut pos_base = 0.0;
        for c in &self.contributions {
            if c.value < 0.0 {
                stacked.negative.push(Segment { category: c.category, value: c.value, base: neg_base });
                neg_base += c.value;
            } else {
                stacked.positive.push(Segment { category: c.category, value: c.value, base: pos_base });
                pos_base += c.value;
            }
        }
        stacked
    }

    /// Sum of all contributions
    pub fn net(&self) -> f64 {
        self.contributions.iter().map(|c| c.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContributionTable {
    rows: Vec<Breakdown>,
}

impl ContributionTable {
    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|r| r.year).collect()
    }

    pub fn for_year(&self, year: i32) -> Result<&Breakdown> {
        self.rows
            .iter()
            .find(|r| r.year == year)
            .ok_or_else(|| NowcastError::InvalidInput(format!("no contribution data for {year}")))
    }
}

pub fn load_contributions<P: AsRef<Path>>(path: P) -> Result<(ContributionTable, CleaningReport)> {
    let path = path.as_ref();
    info!("Loading contribution decomposition from {}", path.display());
    load_contributions_from_reader(File::open(path)?)
}

/// Rows with an unreadable or fractional year are dropped as bad dates; a
/// repeated year keeps its first row. Blank category cells are omitted from
/// that year's breakdown.
pub fn load_contributions_from_reader<R: Read>(reader: R) -> Result<(ContributionTable, CleaningReport)> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let year_col = headers
        .iter()
        .position(|h| h == "Year")
        .ok_or_else(|| NowcastError::InvalidInput("contribution sheet has no Year column".into()))?;
    let category_cols: Vec<(&'static str, usize)> = CATEGORY_ORDER
        .iter()
        .filter_map(|cat| headers.iter().position(|h| h == *cat).map(|idx| (*cat, idx)))
        .collect();

    let mut report = CleaningReport::default();
    let mut rows: Vec<Breakdown> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        report.rows_read += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let raw_year = record.get(year_col).unwrap_or_default();
        let Some((year, start)) = parse_year(raw_year).and_then(|y| year_start(y).map(|d| (y, d))) else {
            report.dropped.push(DroppedRow { line, reason: DropReason::BadDate(raw_year.to_string()) });
            continue;
        };
        if rows.iter().any(|r| r.year == year) {
            report.dropped.push(DroppedRow { line, reason: DropReason::DuplicateDate(start) });
            continue;
        }

        let contributions = category_cols
            .iter()
            .filter_map(|(category, idx)| {
                let value = record.get(*idx)?.parse::<f64>().ok().filter(|v| v.is_finite())?;
                Some(Contribution { category: *category, value })
            })
            .collect();
        rows.push(Breakdown { year, contributions });
    }

    report.rows_kept = rows.len();
    if !report.dropped.is_empty() {
        warn!("Contribution sheet cleaning: {}", report.summary());
    }
    Ok((ContributionTable { rows }, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Cursor;

    // Columns deliberately out of canonical order
    const SHEET: &str = "Year,Other Factors,World Food Price (increase),Exchange Rate (depreciation),Unexplained (residuals),World Food Price (decrease)\n\
                         2022,1.5,4.0,6.0,-0.5,\n\
                         2023.0,-2.0,,10.0,0.25,-1.0\n";

    #[test]
    fn test_load_orders_categories() {
        let (table, report) = load_contributions_from_reader(Cursor::new(SHEET)).unwrap();
        assert_eq!(table.years(), vec![2022, 2023]);
        assert!(report.dropped.is_empty());

        let b = table.for_year(2022).unwrap();
        let cats: Vec<&str> = b.contributions.iter().map(|c| c.category).collect();
        assert_eq!(
            cats,
            vec![
                "World Food Price (increase)",
                "Exchange Rate (depreciation)",
                "Other Factors",
                "Unexplained (residuals)",
            ]
        );
        assert_abs_diff_eq!(b.net(), 11.0);
    }

    #[test]
    fn test_stacking_bases() {
        let table = load_contributions_from_reader(Cursor::new(SHEET)).unwrap().0;
        let stacked = table.for_year(2023).unwrap().stacked();

        // Negatives: WFP decrease -1 (base 0), Other -2 (base -1)
        assert_eq!(stacked.negative.len(), 2);
        assert_eq!(stacked.negative[0].category, "World Food Price (decrease)");
        assert_abs_diff_eq!(stacked.negative[1].base, -1.0);

        // Positives: ER depreciation 10 (base 0), residual 0.25 (base 10)
        assert_eq!(stacked.positive.len(), 2);
        assert_abs_diff_eq!(stacked.positive[1].base, 10.0);
    }

    #[test]
    fn test_missing_year() {
        let table = load_contributions_from_reader(Cursor::new(SHEET)).unwrap().0;
        assert!(matches!(table.for_year(1999), Err(NowcastError::InvalidInput(_))));
    }

    #[test]
    fn test_fractional_and_repeated_years_are_reported() {
        let sheet = "Year,Other Factors\n\
                     2021,1.0\n\
                     2019.5,2.0\n\
                     2021.0,3.0\n\
                     ,4.0\n";
        let (table, report) = load_contributions_from_reader(Cursor::new(sheet)).unwrap();

        assert_eq!(table.years(), vec![2021]);
        assert_abs_diff_eq!(table.for_year(2021).unwrap().net(), 1.0);

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.bad_dates(), 2);
        assert_eq!(report.duplicates(), 1);
        assert_eq!(report.dropped[0], DroppedRow { line: 3, reason: DropReason::BadDate("2019.5".into()) });
        assert_eq!(
            report.dropped[1].reason,
            DropReason::DuplicateDate(chrono::NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
        );
    }
}
