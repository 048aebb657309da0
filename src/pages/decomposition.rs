//! Decomposition page: one year's driver contributions as stacked bars

use serde::Serialize;

use crate::decomposition::{ContributionTable, Stacked};
use crate::error::Result;
use crate::session::SessionContext;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionPage {
    pub year: i32,
    /// Years available for selection
    pub years: Vec<i32>,
    pub stacked: Stacked,
    pub net: f64,
}

/// Gated on a published forecast like the other downstream pages
pub fn decomposition_page(ctx: &SessionContext, table: &ContributionTable, year: i32) -> Result<DecompositionPage> {
    ctx.require_forecast()?;
    let breakdown = table.for_year(year)?;
    Ok(DecompositionPage {
        year,
        years: table.years(),
        stacked: breakdown.stacked(),
        net: breakdown.net(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::load_contributions_from_reader;
    use crate::error::NowcastError;
    use crate::forecast::{ForecastRecord, ForecastRun};
    use crate::model::FeatureSchema;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const SHEET: &str = "Year,World Food Price (increase),Exchange Rate (appreciation),Other Factors\n\
                         2021,3.0,-1.5,0.5\n";

    #[test]
    fn test_gate_then_breakdown() {
        let table = load_contributions_from_reader(Cursor::new(SHEET)).unwrap().0;
        let mut ctx = SessionContext::default();
        assert!(matches!(
            decomposition_page(&ctx, &table, 2021),
            Err(NowcastError::MissingPrerequisite(_))
        ));

        ctx.publish(ForecastRun {
            schema: FeatureSchema::Ridge5,
            base_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            records: vec![ForecastRecord { date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), inflation: 1.0 }],
        });
        let page = decomposition_page(&ctx, &table, 2021).unwrap();
        assert_eq!(page.years, vec![2021]);
        assert_eq!(page.stacked.negative.len(), 1);
        assert_eq!(page.stacked.positive.len(), 2);
        assert_eq!(page.stacked.positive[1].base, 3.0);
        assert_eq!(page.net, 2.0);
    }
}
