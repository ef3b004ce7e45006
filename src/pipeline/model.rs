//! Logistic survival model and feature standardization
//!
//! Each funnel transition gets one binary logistic classifier fit by maximum
//! likelihood (Newton-Raphson / IRLS). The Hessian solve at every iteration
//! uses faer's partial-pivot LU. Fits are deterministic given the same feature
//! matrix and the same `FitConfig`.

use faer::prelude::*;
use faer::Mat;

use super::error::FunnelError;

/// Optimizer settings for the logistic fit.
#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    /// Convergence tolerance on the max absolute coefficient update
    pub tolerance: f64,
    /// Iteration budget before the fit is declared non-convergent
    pub max_iterations: usize,
    /// L2 penalty on the slope coefficients (not the intercept). The default
    /// matches the common scikit-learn default of C = 1.0 and keeps the fit
    /// finite on separable populations.
    pub l2_penalty: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 100,
            l2_penalty: 1.0,
        }
    }
}

/// Per-feature standardization parameters (zero mean, unit variance),
/// fit on a model's training population.
#[derive(Debug, Clone)]
pub struct FeatureScaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl FeatureScaler {
    /// Fit scaling parameters on a feature matrix (rows of equal width).
    pub fn fit(rows: &[[f64; 5]]) -> Self {
        let n = rows.len().max(1) as f64;
        let width = 5;

        let mut means = vec![0.0; width];
        for row in rows {
            for (j, v) in row.iter().enumerate() {
                means[j] += v;
            }
        }
        for m in means.iter_mut() {
            *m /= n;
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for (j, v) in row.iter().enumerate() {
                let d = v - means[j];
                stds[j] += d * d;
            }
        }
        for s in stds.iter_mut() {
            *s = (*s / n).sqrt();
            // Constant features scale to zero, not NaN
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Self { means, stds }
    }

    /// Standardize a single feature vector.
    pub fn transform(&self, row: &[f64; 5]) -> [f64; 5] {
        let mut out = [0.0; 5];
        for j in 0..5 {
            out[j] = (row[j] - self.means[j]) / self.stds[j];
        }
        out
    }
}

/// A fitted linear logistic classifier.
///
/// Immutable after training; coefficients are in standardized feature space.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    /// Slope per standardized feature
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Iterations the optimizer used before converging
    pub iterations: usize,
}

impl LogisticModel {
    /// Fit by maximum likelihood on standardized features.
    ///
    /// `transition` is only used to name the failing transition in errors.
    /// Returns `DegenerateTrainingSet` when the label has no variance, and
    /// `NonConvergence` when the iteration budget runs out.
    pub fn fit(
        rows: &[[f64; 5]],
        labels: &[bool],
        config: &FitConfig,
        transition: &str,
    ) -> Result<Self, FunnelError> {
        let n = rows.len();
        let passed = labels.iter().filter(|&&y| y).count();

        if passed == 0 || passed == n {
            return Err(FunnelError::DegenerateTrainingSet {
                transition: transition.to_string(),
                passed,
                total: n,
            });
        }

        // Design matrix with an intercept column, then penalized IRLS:
        //   beta_{k+1} = beta_k + (X^T W X + lambda I')^-1 (X^T (y - mu) - lambda beta)
        // where I' leaves the intercept unpenalized.
        let p = 6;
        let lambda = config.l2_penalty;
        let mut beta = vec![0.0f64; p];

        for iteration in 1..=config.max_iterations {
            let mut gradient = vec![0.0f64; p];
            let mut hessian = vec![vec![0.0f64; p]; p];

            for (row, &label) in rows.iter().zip(labels.iter()) {
                let x = design_row(row);
                let eta: f64 = x.iter().zip(beta.iter()).map(|(xi, bi)| xi * bi).sum();
                let mu = sigmoid(eta);
                let w = (mu * (1.0 - mu)).max(1e-10);
                let resid = (label as i32 as f64) - mu;

                for i in 0..p {
                    gradient[i] += x[i] * resid;
                    for j in 0..p {
                        hessian[i][j] += x[i] * w * x[j];
                    }
                }
            }

            // Penalty applies to slopes only
            for i in 1..p {
                gradient[i] -= lambda * beta[i];
                hessian[i][i] += lambda;
            }

            let h = Mat::from_fn(p, p, |i, j| hessian[i][j]);
            let g = Mat::from_fn(p, 1, |i, _| gradient[i]);
            let delta = h.partial_piv_lu().solve(&g);

            let mut max_step = 0.0f64;
            for i in 0..p {
                let d = delta[(i, 0)];
                beta[i] += d;
                max_step = max_step.max(d.abs());
            }

            if max_step < config.tolerance {
                return Ok(Self {
                    intercept: beta[0],
                    coefficients: beta[1..].to_vec(),
                    iterations: iteration,
                });
            }
        }

        Err(FunnelError::NonConvergence {
            transition: transition.to_string(),
            iterations: config.max_iterations,
        })
    }

    /// Calibrated probability of passing the transition, for a standardized
    /// feature vector.
    pub fn predict_proba(&self, scaled: &[f64; 5]) -> f64 {
        let eta: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(scaled.iter())
                .map(|(c, x)| c * x)
                .sum::<f64>();
        sigmoid(eta)
    }
}

fn design_row(row: &[f64; 5]) -> [f64; 6] {
    [1.0, row[0], row[1], row[2], row[3], row[4]]
}

fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}
