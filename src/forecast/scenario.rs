//! Batch evaluation of named exogenous scenarios
//!
//! Scenarios share one fitted model and one starting lag state and are run
//! in parallel; results come back in input order.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

use super::{forecast, ExogenousPath, ForecastRun, LagState};
use crate::error::{NowcastError, Result};
use crate::model::{FeatureSchema, Regressor};

/// A labelled exogenous path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub path: ExogenousPath,
}

#[derive(Debug)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: Result<ForecastRun>,
}

pub fn run_scenarios<M: Regressor + Sync + ?Sized>(
    model: &M,
    schema: FeatureSchema,
    base_date: NaiveDate,
    initial: LagState,
    n_periods: usize,
    scenarios: &[Scenario],
) -> Vec<ScenarioOutcome> {
    scenarios
        .par_iter()
        .map(|scenario| {
            let result = forecast(model, schema, base_date, n_periods, &scenario.path, initial)
                .map(|records| ForecastRun { schema, base_date, records });
            ScenarioOutcome { name: scenario.name.clone(), result }
        })
        .collect()
}

/// Scenario names become output file stems, so each must be a plain,
/// unique file name that cannot collide with `summary.csv`
pub fn validate_scenario_names(scenarios: &[Scenario]) -> Result<()> {
    let mut seen = HashSet::new();
    for scenario in scenarios {
        let name = scenario.name.as_str();
        if name.trim().is_empty() {
            return Err(NowcastError::InvalidInput("scenario name is empty".into()));
        }
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(NowcastError::InvalidInput(format!("scenario name '{name}' is not a plain file name")));
        }
        if name.eq_ignore_ascii_case("summary") {
            return Err(NowcastError::InvalidInput("scenario name 'summary' is reserved".into()));
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(NowcastError::InvalidInput(format!("duplicate scenario name '{name}'")));
        }
    }
    Ok(())
}

/// One row per successful scenario: name, months, mean and final inflation
pub fn write_scenario_summary<W: Write>(outcomes: &[ScenarioOutcome], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Scenario", "Months", "Mean Inflation", "Final Inflation"])?;
    for outcome in outcomes {
        let Ok(run) = &outcome.result else { continue };
        let mean = run.mean_inflation().unwrap_or(f64::NAN);
        let last = run.records.last().map_or(f64::NAN, |r| r.inflation);
        wtr.write_record([outcome.name.clone(), run.len().to_string(), mean.to_string(), last.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ExogenousInput;
    use crate::model::tests::synthetic_history;
    use crate::model::{fit, ModelConfig};

    #[test]
    fn test_parallel_matches_sequential_and_keeps_order() {
        let ds = synthetic_history(36);
        let model = fit(&ds, &ModelConfig::default()).unwrap();
        let last = ds.last().unwrap();
        let lags = LagState::from_record(last);

        let scenarios: Vec<Scenario> = (0..8)
            .map(|i| Scenario {
                name: format!("erg_{i}"),
                path: ExogenousPath::Constant(ExogenousInput::new(i as f64, 3.0)),
            })
            .collect();

        let outcomes = run_scenarios(&model, FeatureSchema::Ridge5, last.date, lags, 6, &scenarios);
        assert_eq!(outcomes.len(), 8);

        for (scenario, outcome) in scenarios.iter().zip(&outcomes) {
            assert_eq!(scenario.name, outcome.name);
            let sequential = forecast(&model, FeatureSchema::Ridge5, last.date, 6, &scenario.path, lags).unwrap();
            assert_eq!(outcome.result.as_ref().unwrap().records, sequential);
        }
    }

    #[test]
    fn test_bad_scenario_does_not_sink_the_batch() {
        let ds = synthetic_history(36);
        let model = fit(&ds, &ModelConfig::default()).unwrap();
        let last = ds.last().unwrap();

        let scenarios = vec![
            Scenario { name: "ok".into(), path: ExogenousPath::Constant(ExogenousInput::default()) },
            Scenario { name: "short".into(), path: ExogenousPath::PerMonth(vec![ExogenousInput::default()]) },
        ];
        let outcomes = run_scenarios(&model, FeatureSchema::Ridge5, last.date, LagState::from_record(last), 3, &scenarios);

        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
    }

    fn named(names: &[&str]) -> Vec<Scenario> {
        names
            .iter()
            .map(|n| Scenario { name: n.to_string(), path: ExogenousPath::Constant(ExogenousInput::default()) })
            .collect()
    }

    #[test]
    fn test_scenario_names_must_be_plain_and_unique() {
        assert!(validate_scenario_names(&named(&["calm", "shock, severe", "erg_2"])).is_ok());

        for bad in [
            vec!["../escape"],
            vec!["a/b"],
            vec!["a\\b"],
            vec![".hidden"],
            vec![""],
            vec!["Summary"],
            vec!["calm", "calm"],
            vec!["calm", "CALM"],
        ] {
            assert!(
                matches!(validate_scenario_names(&named(&bad)), Err(NowcastError::InvalidInput(_))),
                "{bad:?} accepted"
            );
        }
    }

    #[test]
    fn test_summary_quotes_names_and_skips_failures() {
        let ds = synthetic_history(36);
        let model = fit(&ds, &ModelConfig::default()).unwrap();
        let last = ds.last().unwrap();

        let mut scenarios = named(&["shock, severe"]);
        scenarios.push(Scenario { name: "short".into(), path: ExogenousPath::PerMonth(vec![ExogenousInput::default()]) });
        let outcomes = run_scenarios(&model, FeatureSchema::Ridge5, last.date, LagState::from_record(last), 4, &scenarios);

        let mut buf = Vec::new();
        write_scenario_summary(&outcomes, &mut buf).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "shock, severe");
        assert_eq!(&rows[0][1], "4");

        let run = outcomes[0].result.as_ref().unwrap();
        assert_eq!(rows[0][2].parse::<f64>().unwrap(), run.mean_inflation().unwrap());
        assert_eq!(rows[0][3].parse::<f64>().unwrap(), run.records[3].inflation);
    }
}
