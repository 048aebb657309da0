//! Recursive one-step-ahead forecasting
//!
//! Each month is predicted from that month's exogenous inputs plus the lag
//! state, and the prediction is then rolled into the lag state as the next
//! month's `Egypt Inflation Lag1`. No rounding happens here.

pub mod export;
pub mod scenario;

use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::dates::add_months;
use crate::data::HistoricalRecord;
use crate::error::{NowcastError, Result};
use crate::model::{FeatureSchema, Regressor};

pub use export::{forecast_csv_string, read_forecast_csv, write_forecast_csv};
pub use scenario::{run_scenarios, validate_scenario_names, write_scenario_summary, Scenario, ScenarioOutcome};

/// User-supplied drivers for one future month
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExogenousInput {
    pub exchange_rate_growth: f64,
    pub global_inflation: f64,
}

impl ExogenousInput {
    pub fn new(exchange_rate_growth: f64, global_inflation: f64) -> Self {
        Self { exchange_rate_growth, global_inflation }
    }
}

/// Exogenous drivers for the whole horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExogenousPath {
    /// Same inputs applied to every month
    Constant(ExogenousInput),
    /// One entry per forecast month, in order
    PerMonth(Vec<ExogenousInput>),
}

impl ExogenousPath {
    /// Expand to exactly `n_periods` inputs
    pub fn resolve(&self, n_periods: usize) -> Result<Vec<ExogenousInput>> {
        match self {
            ExogenousPath::Constant(input) => Ok(vec![*input; n_periods]),
            ExogenousPath::PerMonth(inputs) if inputs.len() == n_periods => Ok(inputs.clone()),
            ExogenousPath::PerMonth(inputs) => Err(NowcastError::InvalidInput(format!(
                "{} exogenous inputs supplied for a {}-month horizon",
                inputs.len(),
                n_periods
            ))),
        }
    }
}

/// Most recent domestic and global inflation values seen by the recurrence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagState {
    pub egypt_lag1: f64,
    pub egypt_lag2: f64,
    pub global_lag1: f64,
    /// Only read by [`FeatureSchema::ElasticNet6`]
    pub global_lag2: f64,
}

impl LagState {
    /// Seed from the last historical month: its current values become lag1,
    /// its recorded lag1 values become lag2
    pub fn from_record(last: &HistoricalRecord) -> Self {
        Self {
            egypt_lag1: last.egypt_inflation,
            egypt_lag2: last.egypt_inflation_lag1,
            global_lag1: last.global_inflation,
            global_lag2: last.global_inflation_lag1,
        }
    }

    /// Feature vector for one step, laid out per `schema`
    pub fn features(&self, schema: FeatureSchema, input: &ExogenousInput) -> Vec<f64> {
        let mut features = vec![
            input.exchange_rate_growth,
            input.global_inflation,
            self.egypt_lag1,
            self.egypt_lag2,
            self.global_lag1,
        ];
        if schema == FeatureSchema::ElasticNet6 {
            features.push(self.global_lag2);
        }
        features
    }

    /// Shift the window after predicting `prediction` under `input`
    pub fn roll(&mut self, prediction: f64, input: &ExogenousInput) {
        self.egypt_lag2 = self.egypt_lag1;
        self.egypt_lag1 = prediction;
        self.global_lag2 = self.global_lag1;
        self.global_lag1 = input.global_inflation;
    }
}

/// One forecast month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    /// Predicted domestic inflation, percent
    pub inflation: f64,
}

/// Walk `model` forward `n_periods` months from `base_date`.
///
/// Month `i` (1-based) is dated `base_date + i months`. The output has exactly
/// `n_periods` entries in date order.
pub fn forecast<M: Regressor + ?Sized>(
    model: &M,
    schema: FeatureSchema,
    base_date: NaiveDate,
    n_periods: usize,
    exogenous: &ExogenousPath,
    initial: LagState,
) -> Result<Vec<ForecastRecord>> {
    if n_periods == 0 {
        return Err(NowcastError::InvalidInput("forecast horizon must be at least one month".into()));
    }
    if model.n_features() != schema.n_features() {
        return Err(NowcastError::InvalidInput(format!(
            "model expects {} features but schema {} provides {}",
            model.n_features(),
            schema,
            schema.n_features()
        )));
    }
    let inputs = exogenous.resolve(n_periods)?;

    let mut lags = initial;
    let mut records = Vec::with_capacity(n_periods);
    for (step, input) in (1..=n_periods).zip(&inputs) {
        let date = add_months(base_date, step as u32).ok_or_else(|| {
            NowcastError::InvalidInput(format!("date overflow {step} months after {base_date}"))
        })?;

        let features = lags.features(schema, input);
        let prediction = model.predict(&features)?;
        debug!("Step {} ({}): features={:?} -> {:.4}", step, date, features, prediction);

        records.push(ForecastRecord { date, inflation: prediction });
        lags.roll(prediction, input);
    }

    Ok(records)
}

/// A completed forecast together with how it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    pub schema: FeatureSchema,
    /// Last historical month; the first forecast is one month later
    pub base_date: NaiveDate,
    pub records: Vec<ForecastRecord>,
}

impl ForecastRun {
    /// Forecast from the last record of the history
    pub fn from_history<M: Regressor + ?Sized>(
        model: &M,
        schema: FeatureSchema,
        last: &HistoricalRecord,
        n_periods: usize,
        exogenous: &ExogenousPath,
    ) -> Result<Self> {
        let records = forecast(model, schema, last.date, n_periods, exogenous, LagState::from_record(last))?;
        info!("Forecast {} months after {} with {}", n_periods, last.date, schema);
        Ok(Self { schema, base_date: last.date, records })
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mean predicted inflation over the horizon, percent
    pub fn mean_inflation(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.records.iter().map(|r| r.inflation).sum::<f64>() / self.records.len() as f64)
    }

    /// Calendar-year mean of the forecast, oldest year first
    pub fn yearly_averages(&self) -> Vec<(i32, f64)> {
        let mut buckets: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for record in &self.records {
            let entry = buckets.entry(record.date.year()).or_insert((0.0, 0));
            entry.0 += record.inflation;
            entry.1 += 1;
        }
        buckets
            .into_iter()
            .map(|(year, (sum, n))| (year, sum / n as f64))
            .collect()
    }
}
