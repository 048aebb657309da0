//! Fiscal figures derived from the average forecast inflation
//!
//! All constants live in the assumption structs so they can be overridden
//! from configuration.

mod import_bill;
mod subsidy;

pub use import_bill::{
    load_food_items, load_food_items_from_reader, AdjustedItem, FoodItem, ImportBill,
    ImportBillAssumptions, ReserveCoverage,
};
pub use subsidy::{SubsidyAssumptions, SubsidyEstimate};
