//! Food subsidy cost scaled by average forecast inflation

use serde::{Deserialize, Serialize};

/// Base-year constants for the subsidy calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubsidyAssumptions {
    /// Food price index in the base year
    #[serde(default = "default_base_price_index")]
    pub base_price_index: f64,

    /// Subsidy bill in the base year, EGP
    #[serde(default = "default_base_subsidy")]
    pub base_subsidy: f64,

    /// Budgeted reference value shown alongside the estimate, EGP
    #[serde(default = "default_reference_subsidy")]
    pub reference_subsidy: f64,
}

fn default_base_price_index() -> f64 { 117.675118055328 }
fn default_base_subsidy() -> f64 { 133_278_000_000.0 }
fn default_reference_subsidy() -> f64 { 140_000_000_000.0 }

impl Default for SubsidyAssumptions {
    fn default() -> Self {
        Self {
            base_price_index: default_base_price_index(),
            base_subsidy: default_base_subsidy(),
            reference_subsidy: default_reference_subsidy(),
        }
    }
}

/// Subsidy figure derived from one forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubsidyEstimate {
    /// Mean forecast inflation used, percent
    pub avg_inflation: f64,
    /// Price index after applying the average inflation
    pub adjusted_index: f64,
    /// Estimated subsidy, EGP
    pub subsidy: f64,
    /// Reference value, EGP
    pub reference: f64,
}

impl SubsidyEstimate {
    pub fn subsidy_billions(&self) -> f64 {
        self.subsidy / 1e9
    }

    /// Estimate minus the reference value, EGP
    pub fn gap_to_reference(&self) -> f64 {
        self.subsidy - self.reference
    }
}

impl SubsidyAssumptions {
    /// Index the base subsidy by the price index moved `avg_inflation` percent.
    ///
    /// Mathematically `subsidy == base_subsidy * (1 + avg_inflation / 100)`,
    /// but the index is scaled up and back down, so the computed value only
    /// matches that closed form up to float rounding. Compare with a relative
    /// tolerance.
    pub fn estimate(&self, avg_inflation: f64) -> SubsidyEstimate {
        let adjusted_index = self.base_price_index * (1.0 + avg_inflation / 100.0);
        let subsidy = adjusted_index * self.base_subsidy / self.base_price_index;
        SubsidyEstimate {
            avg_inflation,
            adjusted_index,
            subsidy,
            reference: self.reference_subsidy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ten_percent_inflation() {
        let est = SubsidyAssumptions::default().estimate(10.0);

        assert_relative_eq!(est.adjusted_index, 117.675118055328 * 1.10, max_relative = 1e-14);
        assert_relative_eq!(est.subsidy, 146_605_800_000.0, max_relative = 1e-12);
        assert_relative_eq!(est.subsidy_billions(), 146.6058, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_inflation_returns_base() {
        let est = SubsidyAssumptions::default().estimate(0.0);
        assert_relative_eq!(est.subsidy, 133_278_000_000.0, max_relative = 1e-14);
        assert!(est.gap_to_reference() < 0.0);
    }

    #[test]
    fn test_deflation_lowers_subsidy() {
        let est = SubsidyAssumptions::default().estimate(-5.0);
        assert_relative_eq!(est.subsidy, 133_278_000_000.0 * 0.95, max_relative = 1e-12);
    }

    #[test]
    fn test_matches_closed_form_within_rounding() {
        let assumptions = SubsidyAssumptions::default();
        for avg in [-12.5, 0.3, 7.77, 24.1, 38.0, 105.25] {
            let closed = assumptions.base_subsidy * (1.0 + avg / 100.0);
            assert_relative_eq!(assumptions.estimate(avg).subsidy, closed, max_relative = 1e-12);
        }
    }
}
