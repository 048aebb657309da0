//! Historical explorer: the cleaned monthly inflation series or the annual
//! subsidies, food imports and NIR series, whichever chart is selected.
//! Needs no forecast.

use serde::Serialize;

use crate::data::{FiscalPoint, InflationPoint};
use crate::error::Result;
use crate::session::{ChartSelection, SessionContext};

/// Both explorer sheets, loaded once per process
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExplorerData {
    pub inflation: Vec<InflationPoint>,
    pub fiscal: Vec<FiscalPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "chart", content = "points", rename_all = "snake_case")]
pub enum ExplorerPage {
    /// Monthly, labelled "Jan 2020" by the caller
    Inflation(Vec<InflationPoint>),
    /// Annual; NIR sits on the secondary axis
    SubsidiesImportsNir(Vec<FiscalPoint>),
}

impl ExplorerPage {
    pub fn len(&self) -> usize {
        match self {
            ExplorerPage::Inflation(points) => points.len(),
            ExplorerPage::SubsidiesImportsNir(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn explorer_page(ctx: &SessionContext, data: &ExplorerData) -> Result<ExplorerPage> {
    ctx.require_forecastable_region()?;
    Ok(match ctx.chart {
        ChartSelection::Inflation => ExplorerPage::Inflation(data.inflation.clone()),
        ChartSelection::SubsidiesImportsNir => ExplorerPage::SubsidiesImportsNir(data.fiscal.clone()),
    })
}
