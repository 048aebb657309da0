//! Historical indicator data: records, month handling and CSV loading,
//! plus the display series behind the explorer

pub mod dates;
pub mod loader;
mod record;
pub mod series;

pub use loader::{load_history, load_history_from_reader, CleaningReport, DropReason, DroppedRow};
pub use record::{HistoricalDataset, HistoricalRecord};
pub use series::{
    load_fiscal_series, load_fiscal_series_from_reader, load_inflation_series, load_inflation_series_from_reader,
    FiscalPoint, InflationPoint,
};
