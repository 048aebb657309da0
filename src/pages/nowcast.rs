//! Inflation nowcast page

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::NowcastConfig;
use crate::data::HistoricalDataset;
use crate::error::{NowcastError, Result};
use crate::forecast::{ExogenousPath, ForecastRun};
use crate::model::{FitSummary, ModelCache};
use crate::session::{ForecastView, SessionContext};

/// User inputs on the nowcast page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowcastRequest {
    /// Months to forecast
    pub horizon: usize,
    pub exogenous: ExogenousPath,
}

/// Chart series for the selected [`ForecastView`].
///
/// In both views the forecast series opens with the last historical point so
/// the two lines join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewSeries {
    /// Calendar-year means of the whole history and of the forecast
    Yearly {
        history: Vec<(i32, f64)>,
        forecast: Vec<(i32, f64)>,
    },
    /// Months of the last historical calendar year, then the forecast months
    Monthly {
        history: Vec<(NaiveDate, f64)>,
        forecast: Vec<(NaiveDate, f64)>,
    },
}

impl ViewSeries {
    pub fn build(view: ForecastView, dataset: &HistoricalDataset, run: &ForecastRun) -> Self {
        match view {
            ForecastView::YearlyAverage => {
                let history = dataset.yearly_average_inflation();
                let forecast = history.last().copied().into_iter().chain(run.yearly_averages()).collect();
                ViewSeries::Yearly { history, forecast }
            }
            ForecastView::MonthlyDetail => {
                let history = dataset.last_year_monthly();
                let forecast = history
                    .last()
                    .copied()
                    .into_iter()
                    .chain(run.records.iter().map(|r| (r.date, r.inflation)))
                    .collect();
                ViewSeries::Monthly { history, forecast }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NowcastResult {
    pub run: ForecastRun,
    pub fit: FitSummary,
    pub series: ViewSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NowcastPage {
    /// Inputs are valid but no run has been requested
    AwaitingRun,
    Ready(Box<NowcastResult>),
}

/// Fit (or reuse) the model, forecast `request.horizon` months and publish
/// the run to the session.
///
/// When the history differs from the one the session last forecast from,
/// fits for the old history are evicted from `cache`.
pub fn nowcast_page(
    ctx: &mut SessionContext,
    cache: &mut ModelCache,
    dataset: &HistoricalDataset,
    config: &NowcastConfig,
    request: &NowcastRequest,
) -> Result<NowcastPage> {
    ctx.require_forecastable_region()?;

    if request.horizon == 0 || request.horizon > config.max_horizon {
        return Err(NowcastError::InvalidInput(format!(
            "horizon {} outside 1..={}",
            request.horizon, config.max_horizon
        )));
    }
    if !ctx.run_requested {
        return Ok(NowcastPage::AwaitingRun);
    }

    let last = dataset
        .last()
        .ok_or_else(|| NowcastError::InvalidInput("historical dataset is empty".into()))?;

    let fingerprint = dataset.fingerprint();
    if let Some(previous) = ctx.history_fingerprint.replace(fingerprint) {
        if previous != fingerprint {
            let evicted = cache.invalidate(previous);
            debug!("History changed, evicted {} cached fits", evicted);
        }
    }

    let model_config = config.model_config();
    let model = cache.get_or_fit(dataset, &model_config)?;

    let run = ForecastRun::from_history(model.as_ref(), model_config.schema, last, request.horizon, &request.exogenous)?;
    info!(
        "Nowcast for {}: {} months, mean {:.2}%",
        ctx.region,
        run.len(),
        run.mean_inflation().unwrap_or(f64::NAN)
    );

    let result = NowcastResult {
        series: ViewSeries::build(ctx.view, dataset, &run),
        fit: model.summary(),
        run: run.clone(),
    };
    ctx.publish(run);

    Ok(NowcastPage::Ready(Box::new(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ExogenousInput;
    use crate::model::tests::synthetic_history;
    use crate::session::Region;

    fn request(horizon: usize) -> NowcastRequest {
        NowcastRequest { horizon, exogenous: ExogenousPath::Constant(ExogenousInput::new(1.0, 2.5)) }
    }

    #[test]
    fn test_waits_for_trigger() {
        let ds = synthetic_history(36);
        let mut ctx = SessionContext::default();
        let mut cache = ModelCache::new();

        let page = nowcast_page(&mut ctx, &mut cache, &ds, &NowcastConfig::default(), &request(12)).unwrap();
        assert_eq!(page, NowcastPage::AwaitingRun);
        assert!(!ctx.forecast.is_ready());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_run_publishes_forecast() {
        let ds = synthetic_history(36);
        let mut ctx = SessionContext::default();
        ctx.run_requested = true;
        let mut cache = ModelCache::new();

        let page = nowcast_page(&mut ctx, &mut cache, &ds, &NowcastConfig::default(), &request(18)).unwrap();
        let NowcastPage::Ready(result) = page else { panic!("expected a forecast") };

        assert_eq!(result.run.len(), 18);
        assert_eq!(ctx.require_forecast().unwrap(), &result.run);
        assert_eq!(ctx.require_forecast_dates().unwrap().len(), 18);
        let ViewSeries::Yearly { history, forecast } = &result.series else { panic!("expected yearly view") };
        assert_eq!(history.len(), 3);
        // 2017 joint, then 2018 and 2019 (6 months)
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[0], history[2]);
        assert_eq!(forecast[1].0, 2018);

        // Second render reuses the fit
        nowcast_page(&mut ctx, &mut cache, &ds, &NowcastConfig::default(), &request(6)).unwrap();
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_region_and_horizon_checks() {
        let ds = synthetic_history(36);
        let mut cache = ModelCache::new();
        let config = NowcastConfig::default();

        let mut ctx = SessionContext::new(Region::Morocco);
        ctx.run_requested = true;
        let err = nowcast_page(&mut ctx, &mut cache, &ds, &config, &request(12)).unwrap_err();
        assert!(matches!(err, NowcastError::UnsupportedRegion(_)));

        let mut ctx = SessionContext::default();
        ctx.run_requested = true;
        for horizon in [0, 61] {
            let err = nowcast_page(&mut ctx, &mut cache, &ds, &config, &request(horizon)).unwrap_err();
            assert!(matches!(err, NowcastError::InvalidInput(_)));
        }
        assert!(!ctx.forecast.is_ready());
    }

    #[test]
    fn test_monthly_detail_joins_last_historical_month() {
        let ds = synthetic_history(30);
        let mut ctx = SessionContext::default();
        ctx.run_requested = true;
        ctx.view = ForecastView::MonthlyDetail;
        let mut cache = ModelCache::new();

        let page = nowcast_page(&mut ctx, &mut cache, &ds, &NowcastConfig::default(), &request(4)).unwrap();
        let NowcastPage::Ready(result) = page else { panic!("expected a forecast") };
        let ViewSeries::Monthly { history, forecast } = &result.series else { panic!("expected monthly view") };

        // History ends Jun 2017: Jan..Jun of that year only
        let last = ds.last().unwrap();
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].0, NaiveDate::from_ymd_opt(2017, 1, 1).unwrap());
        assert_eq!(history[5], (last.date, last.egypt_inflation));

        assert_eq!(forecast.len(), 5);
        assert_eq!(forecast[0], (last.date, last.egypt_inflation));
        for (point, record) in forecast[1..].iter().zip(&result.run.records) {
            assert_eq!(*point, (record.date, record.inflation));
        }
        assert_eq!(forecast[4].0, NaiveDate::from_ymd_opt(2017, 10, 1).unwrap());
    }

    #[test]
    fn test_changed_history_evicts_old_fits() {
        let mut ctx = SessionContext::default();
        ctx.run_requested = true;
        let mut cache = ModelCache::new();
        let config = NowcastConfig::default();

        nowcast_page(&mut ctx, &mut cache, &synthetic_history(36), &config, &request(3)).unwrap();
        nowcast_page(&mut ctx, &mut cache, &synthetic_history(37), &config, &request(3)).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(ctx.history_fingerprint, Some(synthetic_history(37).fingerprint()));
    }
}
