//! Elastic-net regression fitted by cyclic coordinate descent
//!
//! Minimises
//! `1/(2n)·‖y − Xw − b‖² + α·ρ·‖w‖₁ + ½·α·(1−ρ)·‖w‖²`
//! on centred data, with the intercept recovered afterwards.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{check_feature_len, Regressor};
use crate::error::{NowcastError, Result};

/// Hyper-parameters for the elastic-net fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetParams {
    /// Overall penalty strength (α)
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Share of the penalty that is L1 (ρ, 0.0 to 1.0)
    #[serde(default = "default_l1_ratio")]
    pub l1_ratio: f64,

    /// Maximum full passes over the coefficients
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Stop once the largest coefficient update is below `tol` × largest coefficient
    #[serde(default = "default_tol")]
    pub tol: f64,
}

fn default_alpha() -> f64 { 1.0 }
fn default_l1_ratio() -> f64 { 0.9 }
fn default_max_iter() -> usize { 10_000 }
fn default_tol() -> f64 { 1e-4 }

impl Default for ElasticNetParams {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            l1_ratio: default_l1_ratio(),
            max_iter: default_max_iter(),
            tol: default_tol(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElasticNetModel {
    coefficients: Vec<f64>,
    intercept: f64,
    iterations: usize,
    converged: bool,
}

impl ElasticNetModel {
    /// Fit on row-major features `x` and targets `y`
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ElasticNetParams) -> Result<Self> {
        let n = x.len();
        let p = x.first().map(|r| r.len()).unwrap_or(0);
        if n == 0 || p == 0 || y.len() != n {
            return Err(NowcastError::InvalidInput(format!(
                "elastic-net fit needs matching non-empty data ({} rows, {} targets, {} features)",
                n,
                y.len(),
                p
            )));
        }
        if !(0.0..=1.0).contains(&params.l1_ratio) || params.alpha < 0.0 {
            return Err(NowcastError::InvalidInput(format!(
                "elastic-net needs alpha >= 0 and 0 <= l1_ratio <= 1 (got {}, {})",
                params.alpha, params.l1_ratio
            )));
        }

        let nf = n as f64;
        let x_mean: Vec<f64> = (0..p).map(|j| x.iter().map(|r| r[j]).sum::<f64>() / nf).collect();
        let y_mean = y.iter().sum::<f64>() / nf;

        // Column-major centred copy for the coordinate sweeps
        let cols: Vec<Vec<f64>> = (0..p)
            .map(|j| x.iter().map(|r| r[j] - x_mean[j]).collect())
            .collect();
        let col_sq: Vec<f64> = cols.iter().map(|c| c.iter().map(|v| v * v).sum()).collect();

        let l1 = params.alpha * params.l1_ratio * nf;
        let l2 = params.alpha * (1.0 - params.l1_ratio) * nf;

        let mut w = vec![0.0; p];
        let mut residual: Vec<f64> = y.iter().map(|v| v - y_mean).collect();
        let mut iterations = 0;
        let mut converged = false;

        while iterations < params.max_iter {
            iterations += 1;
            let mut max_step: f64 = 0.0;
            let mut max_w: f64 = 0.0;

            for j in 0..p {
                if col_sq[j] == 0.0 {
                    continue;
                }
                let old = w[j];
                let rho: f64 = cols[j].iter().zip(&residual).map(|(a, r)| a * r).sum::<f64>()
                    + col_sq[j] * old;
                let new = soft_threshold(rho, l1) / (col_sq[j] + l2);

                if new != old {
                    let delta = new - old;
                    for (r, a) in residual.iter_mut().zip(&cols[j]) {
                        *r -= a * delta;
                    }
                    w[j] = new;
                }
                max_step = max_step.max((new - old).abs());
                max_w = max_w.max(new.abs());
            }

            if max_w == 0.0 || max_step / max_w < params.tol {
                converged = true;
                break;
            }
        }

        if converged {
            debug!("Elastic net converged after {} sweeps", iterations);
        } else {
            warn!("Elastic net did not converge within {} sweeps", params.max_iter);
        }

        let intercept = y_mean - w.iter().zip(&x_mean).map(|(c, m)| c * m).sum::<f64>();
        Ok(Self { coefficients: w, intercept, iterations, converged })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl Regressor for ElasticNetModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_feature_len(self.n_features(), features)?;
        Ok(self.intercept + self.coefficients.iter().zip(features).map(|(c, v)| c * v).sum::<f64>())
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}
