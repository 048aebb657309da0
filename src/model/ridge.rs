//! Ridge regression with intercept, optionally on standardised features
//!
//! Solves `(Xc'Xc + αI) w = Xc'yc` on centred data, so the intercept is not
//! penalised: `b = ȳ - x̄·w`.

use log::debug;
use nalgebra::{DMatrix, DVector};

use super::scaler::StandardScaler;
use super::{check_feature_len, Regressor};
use crate::error::{NowcastError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RidgeModel {
    scaler: Option<StandardScaler>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl RidgeModel {
    /// Fit on row-major features `x` and targets `y`
    pub fn fit(x: &[Vec<f64>], y: &[f64], alpha: f64, standardize: bool) -> Result<Self> {
        let n = x.len();
        let p = x.first().map(|r| r.len()).unwrap_or(0);
        if n == 0 || p == 0 || y.len() != n {
            return Err(NowcastError::InvalidInput(format!(
                "ridge fit needs matching non-empty data ({} rows, {} targets, {} features)",
                n,
                y.len(),
                p
            )));
        }
        if alpha < 0.0 || !alpha.is_finite() {
            return Err(NowcastError::InvalidInput(format!("ridge alpha must be >= 0, got {alpha}")));
        }

        let scaler = standardize.then(|| StandardScaler::fit(x));
        let rows = match &scaler {
            Some(s) => s.transform(x),
            None => x.to_vec(),
        };

        let x_mean: Vec<f64> = (0..p)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n as f64)
            .collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        let xc = DMatrix::from_fn(n, p, |i, j| rows[i][j] - x_mean[j]);
        let yc = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));

        let xt = xc.transpose();
        let gram = &xt * &xc + DMatrix::identity(p, p) * alpha;
        let xty = &xt * &yc;

        let w = match gram.clone().cholesky() {
            Some(chol) => chol.solve(&xty),
            None => {
                debug!("Ridge normal equations not positive definite, falling back to SVD");
                gram.svd(true, true)
                    .solve(&xty, 1e-12)
                    .map_err(|e| NowcastError::InvalidInput(format!("ridge solve failed: {e}")))?
            }
        };

        if !w.iter().all(|v| v.is_finite()) {
            return Err(NowcastError::InvalidInput("ridge solve produced non-finite coefficients".into()));
        }

        let coefficients: Vec<f64> = w.iter().copied().collect();
        let intercept = y_mean - coefficients.iter().zip(&x_mean).map(|(c, m)| c * m).sum::<f64>();

        Ok(Self { scaler, coefficients, intercept })
    }

    /// Coefficients in the (possibly standardised) feature space
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn is_standardized(&self) -> bool {
        self.scaler.is_some()
    }
}

impl Regressor for RidgeModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_feature_len(self.n_features(), features)?;
        let scaled;
        let x = match &self.scaler {
            Some(s) => {
                scaled = s.transform_row(features);
                scaled.as_slice()
            }
            None => features,
        };
        Ok(self.intercept + self.coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>())
    }
}
