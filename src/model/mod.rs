//! Forecast model: feature schemas, regressors and fitting
//!
//! Two feature layouts exist side by side and are kept as named
//! configurations rather than merged:
//! - [`FeatureSchema::Ridge5`]: standardised ridge on five features
//! - [`FeatureSchema::ElasticNet6`]: unscaled elastic net on six features

mod cache;
mod elastic_net;
mod ridge;
mod scaler;

pub use cache::ModelCache;
pub use elastic_net::{ElasticNetModel, ElasticNetParams};
pub use ridge::RidgeModel;
pub use scaler::StandardScaler;

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::{loader, HistoricalDataset, HistoricalRecord};
use crate::error::{NowcastError, Result};

/// Anything that maps a fixed-order feature vector to predicted inflation
pub trait Regressor {
    /// Length of the feature vector `predict` expects
    fn n_features(&self) -> usize;

    /// Predict next-month domestic inflation
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

pub(crate) fn check_feature_len(expected: usize, features: &[f64]) -> Result<()> {
    if features.len() != expected {
        return Err(NowcastError::InvalidInput(format!(
            "expected {} features, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

/// Feature layout and estimator pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureSchema {
    /// Exchange-rate growth, global inflation, Egypt lag1, Egypt lag2, global lag1.
    /// Standardised ridge.
    #[serde(rename = "ridge5")]
    Ridge5,
    /// Ridge5 plus global lag2. Unscaled elastic net.
    #[serde(rename = "elastic_net6")]
    ElasticNet6,
}

impl FeatureSchema {
    pub fn n_features(self) -> usize {
        self.feature_names().len()
    }

    /// Source column for each feature slot, in order
    pub fn feature_names(self) -> &'static [&'static str] {
        const RIDGE5: [&str; 5] = [
            loader::COL_EXCHANGE_RATE_GROWTH,
            loader::COL_GLOBAL_INFLATION,
            loader::COL_EGYPT_LAG1,
            loader::COL_EGYPT_LAG2,
            loader::COL_GLOBAL_LAG1,
        ];
        const ELASTIC_NET6: [&str; 6] = [
            loader::COL_EXCHANGE_RATE_GROWTH,
            loader::COL_GLOBAL_INFLATION,
            loader::COL_EGYPT_LAG1,
            loader::COL_EGYPT_LAG2,
            loader::COL_GLOBAL_LAG1,
            loader::COL_GLOBAL_LAG2,
        ];
        match self {
            FeatureSchema::Ridge5 => &RIDGE5,
            FeatureSchema::ElasticNet6 => &ELASTIC_NET6,
        }
    }

    /// Training row for a historical record
    pub fn training_row(self, record: &HistoricalRecord) -> Vec<f64> {
        let mut row = vec![
            record.exchange_rate_growth,
            record.global_inflation,
            record.egypt_inflation_lag1,
            record.egypt_inflation_lag2,
            record.global_inflation_lag1,
        ];
        if self == FeatureSchema::ElasticNet6 {
            row.push(record.global_inflation_lag2);
        }
        row
    }
}

impl fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSchema::Ridge5 => write!(f, "ridge5"),
            FeatureSchema::ElasticNet6 => write!(f, "elastic_net6"),
        }
    }
}

impl FromStr for FeatureSchema {
    type Err = NowcastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ridge5" | "ridge" => Ok(FeatureSchema::Ridge5),
            "elastic_net6" | "elastic-net6" | "elasticnet" | "elastic_net" => Ok(FeatureSchema::ElasticNet6),
            other => Err(NowcastError::InvalidInput(format!("unknown feature schema '{other}'"))),
        }
    }
}

/// Ridge hyper-parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RidgeParams {
    #[serde(default = "default_ridge_alpha")]
    pub alpha: f64,
}

fn default_ridge_alpha() -> f64 { 0.001 }

impl Default for RidgeParams {
    fn default() -> Self {
        Self { alpha: default_ridge_alpha() }
    }
}

/// Everything needed to fit a model from a dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_schema")]
    pub schema: FeatureSchema,
    #[serde(default)]
    pub ridge: RidgeParams,
    #[serde(default)]
    pub elastic_net: ElasticNetParams,
}

fn default_schema() -> FeatureSchema { FeatureSchema::Ridge5 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            ridge: RidgeParams::default(),
            elastic_net: ElasticNetParams::default(),
        }
    }
}

impl ModelConfig {
    pub fn with_schema(schema: FeatureSchema) -> Self {
        Self { schema, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    Ridge(RidgeModel),
    ElasticNet(ElasticNetModel),
}

/// In-sample fit diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    pub rows: usize,
    pub rmse: f64,
    pub r2: f64,
}

/// A fitted estimator tagged with the schema it was trained on. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    schema: FeatureSchema,
    kind: ModelKind,
    summary: FitSummary,
}

impl FittedModel {
    pub fn schema(&self) -> FeatureSchema {
        self.schema
    }

    pub fn kind(&self) -> &ModelKind {
        &self.kind
    }

    pub fn summary(&self) -> FitSummary {
        self.summary
    }

    pub fn intercept(&self) -> f64 {
        match &self.kind {
            ModelKind::Ridge(m) => m.intercept(),
            ModelKind::ElasticNet(m) => m.intercept(),
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        match &self.kind {
            ModelKind::Ridge(m) => m.coefficients(),
            ModelKind::ElasticNet(m) => m.coefficients(),
        }
    }
}

impl Regressor for FittedModel {
    fn n_features(&self) -> usize {
        self.schema.n_features()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        match &self.kind {
            ModelKind::Ridge(m) => m.predict(features),
            ModelKind::ElasticNet(m) => m.predict(features),
        }
    }
}

/// Fit the configured estimator on the cleaned history.
///
/// Requires at least as many rows as features (and never fewer than two);
/// an underdetermined fit is reported rather than attempted.
pub fn fit(dataset: &HistoricalDataset, config: &ModelConfig) -> Result<FittedModel> {
    let schema = config.schema;
    let features = schema.n_features();
    let rows = dataset.len();
    if rows < features.max(2) {
        return Err(NowcastError::Underdetermined { rows, features });
    }

    let x: Vec<Vec<f64>> = dataset.records().iter().map(|r| schema.training_row(r)).collect();
    let y: Vec<f64> = dataset.records().iter().map(|r| r.egypt_inflation).collect();

    let kind = match schema {
        FeatureSchema::Ridge5 => ModelKind::Ridge(RidgeModel::fit(&x, &y, config.ridge.alpha, true)?),
        FeatureSchema::ElasticNet6 => ModelKind::ElasticNet(ElasticNetModel::fit(&x, &y, &config.elastic_net)?),
    };

    let mut model = FittedModel {
        schema,
        kind,
        summary: FitSummary { rows, rmse: 0.0, r2: 0.0 },
    };
    model.summary = in_sample_summary(&model, &x, &y)?;

    info!(
        "Fitted {} model on {} rows (RMSE={:.4}, R2={:.4})",
        schema, rows, model.summary.rmse, model.summary.r2
    );
    Ok(model)
}

fn in_sample_summary(model: &FittedModel, x: &[Vec<f64>], y: &[f64]) -> Result<FitSummary> {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let mut sse = 0.0;
    let mut sst = 0.0;
    for (row, actual) in x.iter().zip(y) {
        let pred = model.predict(row)?;
        sse += (actual - pred).powi(2);
        sst += (actual - mean).powi(2);
    }
    let r2 = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };
    Ok(FitSummary { rows: y.len(), rmse: (sse / n).sqrt(), r2 })
}
