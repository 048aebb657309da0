//! Fit the inflation model on the history CSV, forecast the requested horizon,
//! write the forecast CSV and print the derived fiscal figures

use anyhow::{bail, Context, Result};
use clap::Parser;
use food_nowcast::{
    data::{load_fiscal_series, load_inflation_series, load_history},
    forecast::{write_forecast_csv, ExogenousInput, ExogenousPath, ForecastRun},
    metrics::{load_food_items, ImportBill},
    pages::{explorer_page, ExplorerData, ExplorerPage},
    quotes::{collect_quotes, SnapshotQuoteSource, DEFAULT_BOARD},
    session::ChartSelection,
    FeatureSchema, ModelCache, NowcastConfig, SessionContext,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "nowcast")]
#[command(about = "Nowcast Egyptian food-price inflation", long_about = None)]
struct Args {
    /// JSON configuration; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// History CSV, overriding the configured path
    #[arg(long)]
    history: Option<PathBuf>,

    /// ridge5 or elastic_net6, overriding the configured schema
    #[arg(long)]
    schema: Option<FeatureSchema>,

    /// Months to forecast
    #[arg(short = 'n', long)]
    horizon: Option<usize>,

    /// Monthly exchange-rate growth applied to every month
    #[arg(long, default_value = "0.0")]
    exchange_rate_growth: f64,

    /// Monthly global inflation applied to every month
    #[arg(long, default_value = "0.0")]
    global_inflation: f64,

    /// JSON array of per-month inputs; replaces the constant values
    #[arg(long)]
    path_file: Option<PathBuf>,

    /// Forecast CSV destination
    #[arg(short, long, default_value = "inflation_forecasts.csv")]
    output: PathBuf,

    /// Print the commodity quote board from the configured snapshot
    #[arg(long)]
    quotes: bool,

    /// Print the historical explorer sheets
    #[arg(long)]
    explore: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let mut config = match &args.config {
        Some(path) => NowcastConfig::from_path(path).with_context(|| format!("loading config {}", path.display()))?,
        None => NowcastConfig::default(),
    };
    if let Some(history) = args.history {
        config.history_path = history;
    }
    if let Some(schema) = args.schema {
        config.schema = schema;
    }
    let horizon = args.horizon.unwrap_or(config.default_horizon);
    if horizon == 0 || horizon > config.max_horizon {
        bail!("horizon {} outside 1..={}", horizon, config.max_horizon);
    }

    let exogenous = match &args.path_file {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            let inputs: Vec<ExogenousInput> = serde_json::from_reader(file).context("parsing per-month inputs")?;
            ExogenousPath::PerMonth(inputs)
        }
        None => ExogenousPath::Constant(ExogenousInput::new(args.exchange_rate_growth, args.global_inflation)),
    };

    let (dataset, report) = load_history(&config.history_path)
        .with_context(|| format!("loading history {}", config.history_path.display()))?;
    println!("History: {}", report.summary());

    let mut cache = ModelCache::new();
    let model = cache.get_or_fit(&dataset, &config.model_config()).context("fitting model")?;
    let summary = model.summary();
    println!(
        "Model {}: {} rows, RMSE {:.4}, R2 {:.4}",
        config.schema, summary.rows, summary.rmse, summary.r2
    );

    let last = dataset.last().context("history is empty after cleaning")?;
    let run = ForecastRun::from_history(model.as_ref(), config.schema, last, horizon, &exogenous)?;

    println!("\n{:<10} {:>10}", "Month", "Inflation");
    for record in &run.records {
        println!("{:<10} {:>10.2}", record.date.format("%b %Y"), record.inflation);
    }
    println!("\nYearly averages:");
    for (year, avg) in run.yearly_averages() {
        println!("  {year}: {avg:.2}%");
    }

    let file = File::create(&args.output).with_context(|| format!("creating {}", args.output.display()))?;
    write_forecast_csv(&run.records, BufWriter::new(file))?;
    println!("\nWrote {} months to {}", run.len(), args.output.display());

    let avg = run.mean_inflation().context("empty forecast")?;
    let subsidy = config.subsidy.estimate(avg);
    println!("\nAverage forecast inflation: {avg:.2}%");
    println!(
        "Food subsidy estimate: EGP {:.2}bn (reference {:.2}bn)",
        subsidy.subsidy_billions(),
        subsidy.reference / 1e9
    );

    match load_food_items(&config.food_prices_path) {
        Ok(items) => {
            let bill = ImportBill::from_items(&items, avg);
            let total = bill.total();
            println!("Food import bill: USD {:.2}bn", total / 1e9);
            match config.import_bill.reserve_coverage(total) {
                Ok(cov) => println!("Reserves cover {:.2} months of imports", cov.months_covered),
                Err(e) => println!("Reserve coverage unavailable: {e}"),
            }
        }
        Err(e) => log::warn!("Skipping import bill: {}", e),
    }

    if args.quotes {
        let source = SnapshotQuoteSource::from_path(&config.quotes_path)
            .with_context(|| format!("loading quotes {}", config.quotes_path.display()))?;
        println!("\n{:<14} {:>10} {:>8}", "Commodity", "Price", "Chg %");
        for quote in collect_quotes(&source, &DEFAULT_BOARD) {
            let price = quote.price.map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}"));
            let change = quote.change_pct.map_or_else(|| "n/a".to_string(), |c| format!("{c:+.2}"));
            println!("{:<14} {:>10} {:>8}", quote.name, price, change);
        }
    }

    if args.explore {
        let (inflation, inflation_report) = load_inflation_series(&config.inflation_series_path)
            .with_context(|| format!("loading {}", config.inflation_series_path.display()))?;
        let (fiscal, fiscal_report) = load_fiscal_series(&config.fiscal_series_path)
            .with_context(|| format!("loading {}", config.fiscal_series_path.display()))?;
        println!("\nInflation series: {}", inflation_report.summary());
        println!("Fiscal series: {}", fiscal_report.summary());

        let data = ExplorerData { inflation, fiscal };
        let mut ctx = SessionContext::default();
        for chart in [ChartSelection::Inflation, ChartSelection::SubsidiesImportsNir] {
            ctx.chart = chart;
            match explorer_page(&ctx, &data)? {
                ExplorerPage::Inflation(points) => {
                    println!("\n{:<10} {:>10} {:>10}", "Month", "Global", "Egypt");
                    for p in &points {
                        println!("{:<10} {:>10.2} {:>10.2}", p.date.format("%b %Y"), p.global_inflation, p.egypt_inflation);
                    }
                }
                ExplorerPage::SubsidiesImportsNir(points) => {
                    println!("\n{:<6} {:>12} {:>12} {:>10}", "Year", "Subsidies", "Imports", "NIR");
                    for p in &points {
                        println!("{:<6} {:>12.2} {:>12.2} {:>10.2}", p.year, p.subsidies, p.food_imports, p.nir);
                    }
                }
            }
        }
    }

    println!("\nDone in {:?}", start.elapsed());
    Ok(())
}
