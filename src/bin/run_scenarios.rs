//! Evaluate a set of named exogenous scenarios against one fitted model
//!
//! Scenarios are read from a JSON array of `{"name": ..., "path": ...}` and
//! run in parallel. Writes one forecast CSV per scenario plus a summary.

use anyhow::{bail, Context, Result};
use clap::Parser;
use food_nowcast::{
    data::load_history,
    forecast::{run_scenarios, validate_scenario_names, write_forecast_csv, write_scenario_summary, LagState, Scenario},
    FeatureSchema, ModelCache, NowcastConfig,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "run_scenarios")]
#[command(about = "Forecast inflation under many exogenous scenarios", long_about = None)]
struct Args {
    /// JSON array of scenarios
    scenarios: PathBuf,

    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    schema: Option<FeatureSchema>,

    #[arg(short = 'n', long)]
    horizon: Option<usize>,

    /// Directory for per-scenario CSVs and summary.csv
    #[arg(short, long, default_value = "scenario_output")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let mut config = match &args.config {
        Some(path) => NowcastConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))?,
        None => NowcastConfig::default(),
    };
    if let Some(schema) = args.schema {
        config.schema = schema;
    }
    let horizon = args.horizon.unwrap_or(config.default_horizon);
    if horizon == 0 || horizon > config.max_horizon {
        bail!("horizon {} outside 1..={}", horizon, config.max_horizon);
    }

    let scenarios: Vec<Scenario> = serde_json::from_reader(
        File::open(&args.scenarios).with_context(|| format!("opening {}", args.scenarios.display()))?,
    )
    .context("parsing scenarios")?;
    validate_scenario_names(&scenarios)?;
    println!("Loaded {} scenarios", scenarios.len());

    let (dataset, report) = load_history(&config.history_path)
        .with_context(|| format!("loading history {}", config.history_path.display()))?;
    println!("History: {}", report.summary());

    let model = ModelCache::new().get_or_fit(&dataset, &config.model_config())?;
    let last = dataset.last().context("history is empty after cleaning")?;

    let run_start = Instant::now();
    let outcomes = run_scenarios(
        model.as_ref(),
        config.schema,
        last.date,
        LagState::from_record(last),
        horizon,
        &scenarios,
    );
    println!("Ran {} scenarios in {:?}", outcomes.len(), run_start.elapsed());

    fs::create_dir_all(&args.out_dir)?;
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(run) => {
                let file = File::create(args.out_dir.join(format!("{}.csv", outcome.name)))?;
                write_forecast_csv(&run.records, BufWriter::new(file))?;
                let mean = run.mean_inflation().unwrap_or(f64::NAN);
                let last = run.records.last().map_or(f64::NAN, |r| r.inflation);
                println!("  {:<24} mean {:>8.2}%  final {:>8.2}%", outcome.name, mean, last);
            }
            Err(e) => {
                failed += 1;
                log::error!("Scenario {} failed: {}", outcome.name, e);
            }
        }
    }
    write_scenario_summary(&outcomes, BufWriter::new(File::create(args.out_dir.join("summary.csv"))?))?;

    println!(
        "\n{} succeeded, {} failed; output in {} ({:?})",
        outcomes.len() - failed,
        failed,
        args.out_dir.display(),
        start.elapsed()
    );
    Ok(())
}
