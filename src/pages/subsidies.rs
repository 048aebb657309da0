//! Subsidy page: the forecast's average inflation applied to the subsidy bill

use crate::error::Result;
use crate::metrics::{SubsidyAssumptions, SubsidyEstimate};
use crate::session::SessionContext;

use super::forecast_average;

#[derive(Debug, Clone, PartialEq)]
pub struct SubsidiesPage {
    pub estimate: SubsidyEstimate,
}

pub fn subsidies_page(ctx: &SessionContext, assumptions: &SubsidyAssumptions) -> Result<SubsidiesPage> {
    let avg = forecast_average(ctx)?;
    Ok(SubsidiesPage { estimate: assumptions.estimate(avg) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NowcastError;
    use crate::forecast::{ForecastRecord, ForecastRun};
    use crate::model::FeatureSchema;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_requires_forecast() {
        let ctx = SessionContext::default();
        let err = subsidies_page(&ctx, &SubsidyAssumptions::default()).unwrap_err();
        assert!(matches!(err, NowcastError::MissingPrerequisite(_)));
    }

    #[test]
    fn test_uses_mean_of_forecast() {
        let mut ctx = SessionContext::default();
        ctx.publish(ForecastRun {
            schema: FeatureSchema::Ridge5,
            base_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            records: vec![
                ForecastRecord { date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), inflation: 5.0 },
                ForecastRecord { date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), inflation: 15.0 },
            ],
        });

        let page = subsidies_page(&ctx, &SubsidyAssumptions::default()).unwrap();
        assert_relative_eq!(page.estimate.avg_inflation, 10.0);
        assert_relative_eq!(page.estimate.subsidy, 146_605_800_000.0, max_relative = 1e-12);
    }
}
