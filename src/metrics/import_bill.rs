//! Food import bill adjusted for forecast inflation, and the months of
//! imports that net international reserves would cover

use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{NowcastError, Result};

/// One line of the food import basket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(rename = "Food Name")]
    pub name: String,
    #[serde(rename = "Category")]
    pub category: String,
    /// Unit price, USD
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
}

pub fn load_food_items<P: AsRef<Path>>(path: P) -> Result<Vec<FoodItem>> {
    let path = path.as_ref();
    info!("Loading food import basket from {}", path.display());
    load_food_items_from_reader(File::open(path)?)
}

pub fn load_food_items_from_reader<R: Read>(reader: R) -> Result<Vec<FoodItem>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut items = Vec::new();
    for row in rdr.deserialize() {
        items.push(row?);
    }
    Ok(items)
}

/// A basket line after the inflation adjustment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedItem {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub adjusted_price: f64,
    pub quantity: f64,
    /// adjusted_price × quantity
    pub total_value: f64,
}

/// The whole basket repriced at one inflation rate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportBill {
    /// Inflation applied, percent
    pub avg_inflation: f64,
    pub items: Vec<AdjustedItem>,
}

impl ImportBill {
    /// Reprice every item by `(1 + avg_inflation / 100)`
    pub fn from_items(items: &[FoodItem], avg_inflation: f64) -> Self {
        let factor = 1.0 + avg_inflation / 100.0;
        let items = items
            .iter()
            .map(|item| {
                let adjusted_price = item.price * factor;
                AdjustedItem {
                    name: item.name.clone(),
                    category: item.category.clone(),
                    price: item.price,
                    adjusted_price,
                    quantity: item.quantity,
                    total_value: adjusted_price * item.quantity,
                }
            })
            .collect();
        Self { avg_inflation, items }
    }

    /// Sum of every item's adjusted value, USD
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.total_value).sum()
    }

    /// Distinct categories in order of first appearance
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    /// Items in `category`, or all items for `None`
    pub fn filter_category(&self, category: Option<&str>) -> Vec<&AdjustedItem> {
        self.items
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .collect()
    }
}

/// Constants linking the food bill to total imports and reserves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportBillAssumptions {
    /// Portion of the basket value excluded from the import bill, USD
    #[serde(default = "default_non_food_offset")]
    pub non_food_offset: f64,

    /// Non-food annual imports, USD millions
    #[serde(default = "default_other_imports_millions")]
    pub other_imports_millions: f64,

    /// Net international reserves, USD millions
    #[serde(default = "default_reserves_millions")]
    pub reserves_millions: f64,

    #[serde(default = "default_months_per_year")]
    pub months_per_year: f64,
}

fn default_non_food_offset() -> f64 { 16_046_071_327.0 }
fn default_other_imports_millions() -> f64 { 72_134.0 }
fn default_reserves_millions() -> f64 { 46_385.0 }
fn default_months_per_year() -> f64 { 12.0 }

impl Default for ImportBillAssumptions {
    fn default() -> Self {
        Self {
            non_food_offset: default_non_food_offset(),
            other_imports_millions: default_other_imports_millions(),
            reserves_millions: default_reserves_millions(),
            months_per_year: default_months_per_year(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReserveCoverage {
    /// Total annual imports implied by the food bill, USD millions
    pub annual_imports_millions: f64,
    pub monthly_imports_millions: f64,
    /// Months of imports the reserves cover
    pub months_covered: f64,
}

impl ImportBillAssumptions {
    /// Months of imports covered by reserves for a given food bill (USD)
    pub fn reserve_coverage(&self, food_bill: f64) -> Result<ReserveCoverage> {
        let annual_imports_millions = (food_bill - self.non_food_offset) / 1_000_000.0 + self.other_imports_millions;
        let monthly_imports_millions = annual_imports_millions / self.months_per_year;
        if !(monthly_imports_millions > 0.0) {
            return Err(NowcastError::InvalidInput(format!(
                "implied monthly imports must be positive, got {monthly_imports_millions:.2}M"
            )));
        }
        Ok(ReserveCoverage {
            annual_imports_millions,
            monthly_imports_millions,
            months_covered: self.reserves_millions / monthly_imports_millions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const BASKET: &str = "Food Name,Category,Price,Quantity\n\
                          Wheat,Cereals,250,40000000\n\
                          Maize,Cereals,200,30000000\n\
                          Sugar,Sweeteners,500,2000000\n";

    #[test]
    fn test_load_and_reprice() {
        let items = load_food_items_from_reader(Cursor::new(BASKET)).unwrap();
        assert_eq!(items.len(), 3);

        let bill = ImportBill::from_items(&items, 10.0);
        assert_relative_eq!(bill.items[0].adjusted_price, 275.0, max_relative = 1e-12);
        assert_relative_eq!(bill.items[0].total_value, 275.0 * 40_000_000.0, max_relative = 1e-12);
        // (10e9 + 6e9 + 1e9) × 1.1
        assert_relative_eq!(bill.total(), 18.7e9, max_relative = 1e-12);
    }

    #[test]
    fn test_categories_and_filter() {
        let items = load_food_items_from_reader(Cursor::new(BASKET)).unwrap();
        let bill = ImportBill::from_items(&items, 0.0);

        assert_eq!(bill.categories(), vec!["Cereals", "Sweeteners"]);
        assert_eq!(bill.filter_category(Some("Cereals")).len(), 2);
        assert_eq!(bill.filter_category(None).len(), 3);
        assert!(bill.filter_category(Some("Dairy")).is_empty());
    }

    #[test]
    fn test_reserve_coverage_chain() {
        let assumptions = ImportBillAssumptions::default();
        let food_bill = 18.7e9;
        let cov = assumptions.reserve_coverage(food_bill).unwrap();

        let annual = (food_bill - 16_046_071_327.0) / 1e6 + 72_134.0;
        assert_relative_eq!(cov.annual_imports_millions, annual, max_relative = 1e-12);
        assert_relative_eq!(cov.months_covered, 46_385.0 / (annual / 12.0), max_relative = 1e-12);
        assert!(cov.months_covered > 7.0 && cov.months_covered < 8.0);
    }

    #[test]
    fn test_non_positive_imports_rejected() {
        let assumptions = ImportBillAssumptions { other_imports_millions: 0.0, ..Default::default() };
        assert!(assumptions.reserve_coverage(1.0).is_err());
    }
}
