//! Run configuration: input locations, model hyper-parameters, horizon
//! limits and the fiscal constants behind the derived metrics

use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{NowcastError, Result};
use crate::metrics::{ImportBillAssumptions, SubsidyAssumptions};
use crate::model::{ElasticNetParams, FeatureSchema, ModelConfig, RidgeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowcastConfig {
    /// Monthly indicators used to fit the model
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Food import basket
    #[serde(default = "default_food_prices_path")]
    pub food_prices_path: PathBuf,

    /// Annual driver contributions
    #[serde(default = "default_contributions_path")]
    pub contributions_path: PathBuf,

    /// Saved commodity quotes
    #[serde(default = "default_quotes_path")]
    pub quotes_path: PathBuf,

    /// Monthly global and domestic inflation for the explorer
    #[serde(default = "default_inflation_series_path")]
    pub inflation_series_path: PathBuf,

    /// Annual subsidies, food imports and NIR for the explorer
    #[serde(default = "default_fiscal_series_path")]
    pub fiscal_series_path: PathBuf,

    #[serde(default = "default_schema")]
    pub schema: FeatureSchema,

    #[serde(default)]
    pub ridge: RidgeParams,

    #[serde(default)]
    pub elastic_net: ElasticNetParams,

    /// Months forecast when the caller does not say
    #[serde(default = "default_horizon")]
    pub default_horizon: usize,

    /// Longest horizon the pages accept
    #[serde(default = "default_max_horizon")]
    pub max_horizon: usize,

    #[serde(default)]
    pub subsidy: SubsidyAssumptions,

    #[serde(default)]
    pub import_bill: ImportBillAssumptions,
}

fn default_history_path() -> PathBuf { PathBuf::from("data/history.csv") }
fn default_food_prices_path() -> PathBuf { PathBuf::from("data/food_prices.csv") }
fn default_contributions_path() -> PathBuf { PathBuf::from("data/contributions.csv") }
fn default_quotes_path() -> PathBuf { PathBuf::from("data/quotes.csv") }
fn default_inflation_series_path() -> PathBuf { PathBuf::from("data/inflation_series.csv") }
fn default_fiscal_series_path() -> PathBuf { PathBuf::from("data/fiscal_series.csv") }
fn default_schema() -> FeatureSchema { FeatureSchema::Ridge5 }
fn default_horizon() -> usize { 12 }
fn default_max_horizon() -> usize { 60 }

impl Default for NowcastConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            food_prices_path: default_food_prices_path(),
            contributions_path: default_contributions_path(),
            quotes_path: default_quotes_path(),
            inflation_series_path: default_inflation_series_path(),
            fiscal_series_path: default_fiscal_series_path(),
            schema: default_schema(),
            ridge: RidgeParams::default(),
            elastic_net: ElasticNetParams::default(),
            default_horizon: default_horizon(),
            max_horizon: default_max_horizon(),
            subsidy: SubsidyAssumptions::default(),
            import_bill: ImportBillAssumptions::default(),
        }
    }
}

impl NowcastConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_horizon == 0 {
            return Err(NowcastError::InvalidInput("max_horizon must be at least 1".into()));
        }
        if self.default_horizon == 0 || self.default_horizon > self.max_horizon {
            return Err(NowcastError::InvalidInput(format!(
                "default_horizon {} outside 1..={}",
                self.default_horizon, self.max_horizon
            )));
        }
        if !(0.0..=1.0).contains(&self.elastic_net.l1_ratio) {
            return Err(NowcastError::InvalidInput(format!(
                "elastic_net.l1_ratio {} outside [0, 1]",
                self.elastic_net.l1_ratio
            )));
        }
        Ok(())
    }

    /// Fitting parameters for the configured schema
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            schema: self.schema,
            ridge: self.ridge,
            elastic_net: self.elastic_net,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_empty_object_gives_defaults() {
        let cfg = NowcastConfig::from_reader(Cursor::new("{}")).unwrap();
        assert_eq!(cfg, NowcastConfig::default());
        assert_eq!(cfg.default_horizon, 12);
        assert_eq!(cfg.max_horizon, 60);
        assert_eq!(cfg.model_config(), ModelConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "schema": "elastic_net6",
            "elastic_net": {"alpha": 0.5},
            "subsidy": {"reference_subsidy": 150000000000.0},
            "max_horizon": 24
        }"#;
        let cfg = NowcastConfig::from_reader(Cursor::new(json)).unwrap();

        let model = cfg.model_config();
        assert_eq!(model.schema, FeatureSchema::ElasticNet6);
        assert_eq!(model.elastic_net.alpha, 0.5);
        assert_eq!(model.elastic_net.l1_ratio, 0.9);
        assert_eq!(cfg.subsidy.reference_subsidy, 150e9);
        assert_eq!(cfg.subsidy.base_subsidy, 133_278_000_000.0);
        assert_eq!(cfg.max_horizon, 24);
    }

    #[test]
    fn test_inconsistent_horizons_rejected() {
        let err = NowcastConfig::from_reader(Cursor::new(r#"{"max_horizon": 6}"#)).unwrap_err();
        assert!(matches!(err, NowcastError::InvalidInput(_)));
    }
}
