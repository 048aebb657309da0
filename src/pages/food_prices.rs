//! Food prices page: import basket repriced at the forecast's average
//! inflation, with the reserve coverage it implies

use serde::Serialize;

use crate::error::Result;
use crate::metrics::{AdjustedItem, FoodItem, ImportBill, ImportBillAssumptions, ReserveCoverage};
use crate::session::SessionContext;

use super::forecast_average;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodPricesPage {
    pub avg_inflation: f64,
    pub categories: Vec<String>,
    /// Items shown after the category filter
    pub items: Vec<AdjustedItem>,
    /// Whole-basket bill, USD; unaffected by the filter
    pub total_bill: f64,
    pub coverage: ReserveCoverage,
}

pub fn food_prices_page(
    ctx: &SessionContext,
    items: &[FoodItem],
    category: Option<&str>,
    assumptions: &ImportBillAssumptions,
) -> Result<FoodPricesPage> {
    let avg_inflation = forecast_average(ctx)?;
    let bill = ImportBill::from_items(items, avg_inflation);
    let total_bill = bill.total();
    let coverage = assumptions.reserve_coverage(total_bill)?;

    Ok(FoodPricesPage {
        avg_inflation,
        categories: bill.categories().into_iter().map(String::from).collect(),
        items: bill.filter_category(category).into_iter().cloned().collect(),
        total_bill,
        coverage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NowcastError;
    use crate::forecast::{ForecastRecord, ForecastRun};
    use crate::model::FeatureSchema;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn item(name: &str, category: &str, price: f64, quantity: f64) -> FoodItem {
        FoodItem { name: name.into(), category: category.into(), price, quantity }
    }

    fn basket() -> Vec<FoodItem> {
        vec![
            item("Wheat", "Cereals", 250.0, 40_000_000.0),
            item("Oil", "Oils", 1000.0, 1_000_000.0),
        ]
    }

    #[test]
    fn test_requires_forecast() {
        let ctx = SessionContext::default();
        let err = food_prices_page(&ctx, &basket(), None, &ImportBillAssumptions::default()).unwrap_err();
        assert!(matches!(err, NowcastError::MissingPrerequisite(_)));
    }

    #[test]
    fn test_filter_does_not_change_total() {
        let mut ctx = SessionContext::default();
        ctx.publish(ForecastRun {
            schema: FeatureSchema::Ridge5,
            base_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            records: vec![ForecastRecord { date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), inflation: 20.0 }],
        });
        let assumptions = ImportBillAssumptions::default();

        let all = food_prices_page(&ctx, &basket(), None, &assumptions).unwrap();
        let oils = food_prices_page(&ctx, &basket(), Some("Oils"), &assumptions).unwrap();

        assert_eq!(all.items.len(), 2);
        assert_eq!(oils.items.len(), 1);
        assert_eq!(oils.categories, vec!["Cereals".to_string(), "Oils".to_string()]);
        // (10e9 + 1e9) × 1.2
        assert_relative_eq!(all.total_bill, 13.2e9, max_relative = 1e-12);
        assert_eq!(all.total_bill, oils.total_bill);
        assert_eq!(all.coverage, oils.coverage);
    }
}
