//! Historical indicator records and the cleaned dataset

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::{NowcastError, Result};

/// One month of macro indicators, with lags as recorded in the source sheet
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoricalRecord {
    /// First day of the observation month
    pub date: NaiveDate,
    /// Domestic (Egypt) food inflation, percent
    pub egypt_inflation: f64,
    /// Global food inflation, percent
    pub global_inflation: f64,
    /// Exchange-rate growth, percent
    pub exchange_rate_growth: f64,
    pub egypt_inflation_lag1: f64,
    pub egypt_inflation_lag2: f64,
    pub global_inflation_lag1: f64,
    pub global_inflation_lag2: f64,
}

/// Cleaned history: strictly increasing unique months, no missing values
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDataset {
    records: Vec<HistoricalRecord>,
}

impl HistoricalDataset {
    /// Build from records that are already clean.
    ///
    /// Fails if the dates are not strictly increasing or any value is non-finite.
    pub fn new(records: Vec<HistoricalRecord>) -> Result<Self> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(NowcastError::InvalidInput(format!(
                    "history dates must be strictly increasing ({} follows {})",
                    pair[1].date, pair[0].date
                )));
            }
        }
        if let Some(bad) = records.iter().find(|r| !r.values().iter().all(|v| v.is_finite())) {
            return Err(NowcastError::InvalidInput(format!(
                "history row {} has non-finite values",
                bad.date
            )));
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent month, which seeds the forecast lag state
    pub fn last(&self) -> Option<&HistoricalRecord> {
        self.records.last()
    }

    /// Stable hash of every date and value, used as the model cache key
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.records.len().hash(&mut hasher);
        for record in &self.records {
            record.date.num_days_from_ce().hash(&mut hasher);
            for value in record.values() {
                value.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Calendar-year mean of domestic inflation, oldest year first
    pub fn yearly_average_inflation(&self) -> Vec<(i32, f64)> {
        let mut buckets: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for record in &self.records {
            let entry = buckets.entry(record.date.year()).or_insert((0.0, 0));
            entry.0 += record.egypt_inflation;
            entry.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(year, (sum, n))| (year, sum / n as f64))
            .collect()
    }

    /// Monthly domestic inflation for the latest calendar year present
    pub fn last_year_monthly(&self) -> Vec<(NaiveDate, f64)> {
        let Some(year) = self.records.last().map(|r| r.date.year()) else {
            return Vec::new();
        };
        self.records
            .iter()
            .filter(|r| r.date.year() == year)
            .map(|r| (r.date, r.egypt_inflation))
            .collect()
    }
}

impl HistoricalRecord {
    /// All numeric fields in column order
    pub fn values(&self) -> [f64; 7] {
        [
            self.exchange_rate_growth,
            self.global_inflation,
            self.egypt_inflation,
            self.egypt_inflation_lag1,
            self.egypt_inflation_lag2,
            self.global_inflation_lag1,
            self.global_inflation_lag2,
        ]
    }
}
