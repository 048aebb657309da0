//! CSV export of forecast results
//!
//! Layout matches the dashboard download: a `Year` index formatted as
//! "Jan 2025" and a single `Inflation` column. Values are written at full
//! precision so a re-import reproduces them exactly.

use std::io::{Read, Write};

use super::ForecastRecord;
use crate::data::dates::{format_month, parse_month_label};
use crate::error::{NowcastError, Result};

/// Default download file name
pub const FORECAST_FILE_NAME: &str = "inflation_forecasts.csv";

pub fn write_forecast_csv<W: Write>(records: &[ForecastRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Year", "Inflation"])?;
    for record in records {
        wtr.write_record([format_month(record.date), record.inflation.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn forecast_csv_string(records: &[ForecastRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_forecast_csv(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| NowcastError::InvalidInput(format!("non-UTF-8 CSV output: {e}")))
}

pub fn read_forecast_csv<R: Read>(reader: R) -> Result<Vec<ForecastRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let inflation_col = headers
        .iter()
        .position(|h| h == "Inflation")
        .ok_or_else(|| NowcastError::InvalidInput("forecast CSV has no Inflation column".into()))?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let label = row.get(0).unwrap_or_default();
        let date = parse_month_label(label)
            .ok_or_else(|| NowcastError::InvalidInput(format!("bad forecast month '{label}'")))?;
        let raw = row.get(inflation_col).unwrap_or_default();
        let inflation = raw
            .parse::<f64>()
            .map_err(|_| NowcastError::InvalidInput(format!("bad inflation value '{raw}' for {label}")))?;
        records.push(ForecastRecord { date, inflation });
    }
    Ok(records)
}
