//! Per-session state shared between page handlers
//!
//! Every field that one page produces and another consumes is a [`Slot`],
//! so a missing forecast is a typed state rather than an absent key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{NowcastError, Result};
use crate::forecast::ForecastRun;

/// Countries offered on the landing page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Algeria,
    Bahrain,
    Egypt,
    Jordan,
    Kuwait,
    Lebanon,
    Morocco,
    Oman,
    Qatar,
    Saudi,
    Tunisia,
    #[serde(rename = "UAE")]
    Uae,
}

impl Region {
    pub const ALL: [Region; 12] = [
        Region::Algeria,
        Region::Bahrain,
        Region::Egypt,
        Region::Jordan,
        Region::Kuwait,
        Region::Lebanon,
        Region::Morocco,
        Region::Oman,
        Region::Qatar,
        Region::Saudi,
        Region::Tunisia,
        Region::Uae,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Algeria => "Algeria",
            Region::Bahrain => "Bahrain",
            Region::Egypt => "Egypt",
            Region::Jordan => "Jordan",
            Region::Kuwait => "Kuwait",
            Region::Lebanon => "Lebanon",
            Region::Morocco => "Morocco",
            Region::Oman => "Oman",
            Region::Qatar => "Qatar",
            Region::Saudi => "Saudi",
            Region::Tunisia => "Tunisia",
            Region::Uae => "UAE",
        }
    }

    /// Only Egypt has data and a model behind it
    pub fn supports_forecasting(self) -> bool {
        self == Region::Egypt
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = NowcastError;

    fn from_str(s: &str) -> Result<Self> {
        Region::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NowcastError::InvalidInput(format!("unknown region '{s}'")))
    }
}

/// Value produced by an earlier page, or not yet
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot<T> {
    #[default]
    Unset,
    Ready(T),
}

impl<T> Slot<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Slot::Ready(v) => Some(v),
            Slot::Unset => None,
        }
    }

    /// The value, or a `MissingPrerequisite` naming `what`
    pub fn require(&self, what: &str) -> Result<&T> {
        self.get()
            .ok_or_else(|| NowcastError::MissingPrerequisite(format!("{what} has not been produced yet")))
    }

    pub fn set(&mut self, value: T) {
        *self = Slot::Ready(value);
    }

    pub fn clear(&mut self) {
        *self = Slot::Unset;
    }
}

/// Series shown by the historical explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartSelection {
    #[default]
    Inflation,
    SubsidiesImportsNir,
}

/// How the forecast page presents the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ForecastView {
    #[default]
    YearlyAverage,
    MonthlyDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub region: Region,
    /// Set by the external login gate
    pub authenticated: bool,
    pub chart: ChartSelection,
    pub view: ForecastView,
    /// The nowcast page only forecasts once this is set
    pub run_requested: bool,
    pub forecast_dates: Slot<Vec<NaiveDate>>,
    pub forecast: Slot<ForecastRun>,
    /// Fingerprint of the history the last forecast was fitted on
    pub history_fingerprint: Option<u64>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Region::Egypt)
    }
}

impl SessionContext {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            authenticated: false,
            chart: ChartSelection::default(),
            view: ForecastView::default(),
            run_requested: false,
            forecast_dates: Slot::Unset,
            forecast: Slot::Unset,
            history_fingerprint: None,
        }
    }

    /// Switching region discards results computed for the previous one
    pub fn select_region(&mut self, region: Region) {
        if region != self.region {
            self.region = region;
            self.forecast_dates.clear();
            self.forecast.clear();
            self.run_requested = false;
        }
    }

    pub fn require_forecastable_region(&self) -> Result<Region> {
        if self.region.supports_forecasting() {
            Ok(self.region)
        } else {
            Err(NowcastError::UnsupportedRegion(self.region.to_string()))
        }
    }

    pub fn require_forecast(&self) -> Result<&ForecastRun> {
        self.forecast.require("inflation forecast")
    }

    pub fn require_forecast_dates(&self) -> Result<&[NaiveDate]> {
        self.forecast_dates.require("forecast dates").map(Vec::as_slice)
    }

    /// Store a completed run and its dates together
    pub fn publish(&mut self, run: ForecastRun) {
        self.forecast_dates.set(run.dates());
        self.forecast.set(run);
    }
}
