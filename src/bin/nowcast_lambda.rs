//! HTTP endpoint for on-demand forecasts
//!
//! The model is fitted once at cold start. Each POST carries a horizon and an
//! exogenous path and receives the forecast plus the subsidy estimate.
//!
//! Request body:
//! `{"horizon": 12, "exogenous": {"constant": {"exchange_rate_growth": 1.0, "global_inflation": 2.5}}}`

use food_nowcast::{
    data::{dates::format_month, load_history, HistoricalRecord},
    forecast::{ExogenousPath, ForecastRun},
    metrics::SubsidyEstimate,
    FittedModel, ModelCache, NowcastConfig, NowcastError,
};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ForecastRequest {
    #[serde(default)]
    horizon: Option<usize>,
    exogenous: ExogenousPath,
}

#[derive(Debug, Serialize)]
struct MonthValue {
    month: String,
    inflation: f64,
}

#[derive(Debug, Serialize)]
struct ForecastResponse {
    schema: String,
    base_date: String,
    forecast: Vec<MonthValue>,
    mean_inflation: f64,
    subsidy: SubsidyEstimate,
}

struct AppState {
    config: NowcastConfig,
    model: Arc<FittedModel>,
    last: HistoricalRecord,
}

impl AppState {
    fn load() -> Result<Self, Error> {
        let config = match std::env::var("NOWCAST_CONFIG") {
            Ok(path) => NowcastConfig::from_path(path)?,
            Err(_) => NowcastConfig::default(),
        };
        let (dataset, report) = load_history(&config.history_path)?;
        log::info!("Cold start: {}", report.summary());

        let model = ModelCache::new().get_or_fit(&dataset, &config.model_config())?;
        let last = *dataset
            .last()
            .ok_or_else(|| NowcastError::InvalidInput("history is empty after cleaning".into()))?;
        Ok(Self { config, model, last })
    }

    fn forecast(&self, body: &[u8]) -> Result<ForecastResponse, NowcastError> {
        let request: ForecastRequest = serde_json::from_slice(body)?;
        let horizon = request.horizon.unwrap_or(self.config.default_horizon);
        if horizon == 0 || horizon > self.config.max_horizon {
            return Err(NowcastError::InvalidInput(format!(
                "horizon {} outside 1..={}",
                horizon, self.config.max_horizon
            )));
        }

        let run = ForecastRun::from_history(self.model.as_ref(), self.config.schema, &self.last, horizon, &request.exogenous)?;
        let mean_inflation = run
            .mean_inflation()
            .ok_or_else(|| NowcastError::InvalidInput("empty forecast".into()))?;

        Ok(ForecastResponse {
            schema: run.schema.to_string(),
            base_date: format_month(run.base_date),
            forecast: run
                .records
                .iter()
                .map(|r| MonthValue { month: format_month(r.date), inflation: r.inflation })
                .collect(),
            mean_inflation,
            subsidy: self.config.subsidy.estimate(mean_inflation),
        })
    }
}

fn json_response(status: u16, body: String) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))?)
}

async fn handler(state: &AppState, event: Request) -> Result<Response<Body>, Error> {
    match state.forecast(event.body().as_ref()) {
        Ok(response) => json_response(200, serde_json::to_string(&response)?),
        Err(e @ (NowcastError::InvalidInput(_) | NowcastError::Json(_))) => {
            log::warn!("Rejected request: {}", e);
            json_response(400, serde_json::json!({ "error": e.to_string() }).to_string())
        }
        Err(e) => {
            log::error!("Forecast failed: {}", e);
            json_response(500, serde_json::json!({ "error": e.to_string() }).to_string())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let state = AppState::load()?;
    let state = &state;
    run(service_fn(move |event: Request| async move { handler(state, event).await })).await
}
