//! Page handlers
//!
//! Each handler takes the session context explicitly and returns typed data
//! for one dashboard page. Rendering is left to the caller. Pages downstream
//! of the nowcast fail with `MissingPrerequisite` until a forecast has been
//! published to the context.

pub mod decomposition;
pub mod explorer;
pub mod food_prices;
pub mod nowcast;
pub mod subsidies;

pub use decomposition::{decomposition_page, DecompositionPage};
pub use explorer::{explorer_page, ExplorerData, ExplorerPage};
pub use food_prices::{food_prices_page, FoodPricesPage};
pub use nowcast::{nowcast_page, NowcastPage, NowcastRequest, NowcastResult, ViewSeries};
pub use subsidies::{subsidies_page, SubsidiesPage};

use crate::error::{NowcastError, Result};
use crate::session::SessionContext;

/// Mean inflation of the published forecast, percent
pub(crate) fn forecast_average(ctx: &SessionContext) -> Result<f64> {
    ctx.require_forecast()?
        .mean_inflation()
        .ok_or_else(|| NowcastError::MissingPrerequisite("published forecast is empty".into()))
}
