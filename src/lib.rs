//! Nowcasting of Egyptian food-price inflation and its fiscal knock-on effects.
//!
//! The pipeline mirrors the dashboard it replaces:
//! 1. Load monthly macro indicators and drop incomplete rows ([`data`])
//! 2. Fit a ridge or elastic-net regression on the lagged features ([`model`])
//! 3. Walk the model forward one month at a time, feeding each prediction back
//!    in as the next month's lag ([`forecast`])
//! 4. Turn the average forecast inflation into subsidy, import-bill and
//!    reserve-coverage figures ([`metrics`])
//!
//! Page handlers in [`pages`] chain these steps through an explicit
//! [`session::SessionContext`] instead of a global key-value store.

pub mod config;
pub mod data;
pub mod decomposition;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod model;
pub mod pages;
pub mod quotes;
pub mod session;

pub use config::NowcastConfig;
pub use data::{HistoricalDataset, HistoricalRecord, CleaningReport};
pub use error::{NowcastError, Result};
pub use forecast::{ExogenousInput, ExogenousPath, ForecastRecord, ForecastRun, LagState};
pub use model::{FeatureSchema, FittedModel, ModelCache, ModelConfig, Regressor};
pub use session::SessionContext;
