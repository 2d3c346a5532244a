// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gaussian Mixture Fitter
//!
//! Expectation-Maximization over a data matrix whose rows are samples.
//!
//! Densities are evaluated in log-space through a Cholesky factor of each
//! covariance. A covariance without a Cholesky factor (singular or not
//! positive definite) removes its component from that step instead of failing
//! it: zero responsibility column in the E-step, no contribution to the
//! log-likelihood.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Implements the `ExpectationMaximizer` contract

use nalgebra::linalg::Cholesky;
use nalgebra::{DMatrix, DVector, Dyn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info, warn};

use crate::domain::config::EmConfig;
use crate::domain::error::{AmemError, AmemResult};
use crate::domain::model::{ModelParameters, ResponsibilityMatrix};
use crate::domain::repository::ExpectationMaximizer;

/// Added to the diagonal of every re-estimated covariance.
pub const COVARIANCE_REGULARIZATION: f64 = 1e-6;

/// EM fitter for Gaussian mixtures with full covariances.
#[derive(Debug, Clone)]
pub struct GaussianMixtureFitter {
    max_iterations: usize,
    tolerance: f64,
    seed: Option<u64>,
}

impl GaussianMixtureFitter {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            seed: None,
        }
    }

    pub fn from_config(config: &EmConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
            seed: config.seed,
        }
    }

    /// Every subsequent `fit` re-seeds from `seed`, so identical data yields
    /// identical parameters.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        }
    }

    /// Standard-normal means, identity covariances, uniform weights.
    fn initial_parameters(&self, n_components: usize, n_features: usize) -> ModelParameters {
        let mut rng = self.rng();
        let means = (0..n_components)
            .map(|_| DVector::from_fn(n_features, |_, _| rng.sample::<f64, _>(StandardNormal)))
            .collect();

        ModelParameters {
            means,
            covariances: vec![DMatrix::identity(n_features, n_features); n_components],
            weights: DVector::from_element(n_components, 1.0 / n_components as f64),
            converged: false,
            n_iterations: 0,
        }
    }

    /// `log(weight[k]) + log N(x_i | k)` for every sample/component pair.
    /// Singular or zero-weight components hold `-inf` in their column.
    fn log_joint(&self, data: &DMatrix<f64>, parameters: &ModelParameters) -> DMatrix<f64> {
        let n_samples = data.nrows();
        let n_components = parameters.n_components();
        let mut log_joint = DMatrix::from_element(n_samples, n_components, f64::NEG_INFINITY);

        for k in 0..n_components {
            let weight = parameters.weights[k];
            if weight <= 0.0 {
                continue;
            }
            let Some(density) =
                ComponentDensity::new(&parameters.means[k], &parameters.covariances[k])
            else {
                debug!(component = k, "Singular covariance, component skipped");
                continue;
            };

            let log_weight = weight.ln();
            for i in 0..n_samples {
                let sample = data.row(i).transpose();
                log_joint[(i, k)] = log_weight + density.log_pdf(&sample);
            }
        }

        log_joint
    }
}

impl ExpectationMaximizer for GaussianMixtureFitter {
    fn fit(&self, data: &DMatrix<f64>, n_components: usize) -> AmemResult<ModelParameters> {
        if data.is_empty() {
            return Err(AmemError::InvalidInput(
                "Cannot fit EM on empty data".to_string(),
            ));
        }
        if n_components == 0 {
            return Err(AmemError::InvalidInput(
                "Number of components must be positive".to_string(),
            ));
        }

        let (n_samples, n_features) = data.shape();
        debug!(
            n_samples,
            n_features,
            n_components,
            max_iterations = self.max_iterations,
            "Starting EM fit"
        );

        let mut parameters = self.initial_parameters(n_components, n_features);
        let mut previous = f64::NEG_INFINITY;

        for iteration in 0..self.max_iterations {
            let responsibilities = self.expectation_step(data, &parameters);
            parameters = self.maximization_step(data, &responsibilities);

            let log_likelihood = self.log_likelihood(data, &parameters);
            debug!(iteration, log_likelihood, "EM iteration complete");

            if log_likelihood - previous < self.tolerance {
                info!(
                    n_iterations = iteration + 1,
                    log_likelihood, "EM converged"
                );
                return Ok(parameters.with_progress(true, iteration + 1));
            }
            previous = log_likelihood;
        }

        warn!(
            max_iterations = self.max_iterations,
            log_likelihood = previous,
            "EM did not converge within the iteration budget"
        );
        Ok(parameters.with_progress(false, self.max_iterations))
    }

    fn expectation_step(
        &self,
        data: &DMatrix<f64>,
        parameters: &ModelParameters,
    ) -> ResponsibilityMatrix {
        let mut responsibilities = self.log_joint(data, parameters);

        for mut row in responsibilities.row_iter_mut() {
            let max = row.max();
            if !max.is_finite() {
                // No component carries mass for this sample
                row.fill(0.0);
                continue;
            }
            row.apply(|value| *value = (*value - max).exp());
            let total = row.sum();
            row /= total;
        }

        responsibilities
    }

    fn maximization_step(
        &self,
        data: &DMatrix<f64>,
        responsibilities: &ResponsibilityMatrix,
    ) -> ModelParameters {
        let (n_samples, n_features) = data.shape();
        let n_components = responsibilities.ncols();

        let mut means = Vec::with_capacity(n_components);
        let mut covariances = Vec::with_capacity(n_components);
        let mut weights = DVector::zeros(n_components);

        for k in 0..n_components {
            let column = responsibilities.column(k);
            let n_k = column.sum();
            weights[k] = n_k / n_samples as f64;

            if n_k <= 0.0 {
                // Collapses to the origin with unit covariance
                means.push(DVector::zeros(n_features));
                covariances.push(DMatrix::identity(n_features, n_features));
                continue;
            }

            let mean = data.tr_mul(&column) / n_k;

            let mut covariance = DMatrix::zeros(n_features, n_features);
            for i in 0..n_samples {
                let r = column[i];
                if r == 0.0 {
                    continue;
                }
                let diff = data.row(i).transpose() - &mean;
                covariance += (&diff * diff.transpose()) * r;
            }
            covariance /= n_k;
            for d in 0..n_features {
                covariance[(d, d)] += COVARIANCE_REGULARIZATION;
            }

            means.push(mean);
            covariances.push(covariance);
        }

        ModelParameters {
            means,
            covariances,
            weights,
            converged: false,
            n_iterations: 0,
        }
    }

    fn log_likelihood(&self, data: &DMatrix<f64>, parameters: &ModelParameters) -> f64 {
        let log_joint = self.log_joint(data, parameters);

        log_joint
            .row_iter()
            .map(|row| {
                let max = row.max();
                if !max.is_finite() {
                    // Zero mixture density contributes nothing
                    return 0.0;
                }
                max + row.iter().map(|value| (value - max).exp()).sum::<f64>().ln()
            })
            .sum()
    }
}

/// Log-density evaluator for one multivariate normal component.
struct ComponentDensity {
    mean: DVector<f64>,
    cholesky: Cholesky<f64, Dyn>,
    log_norm: f64,
}

impl ComponentDensity {
    /// `None` when the covariance has no Cholesky factor.
    fn new(mean: &DVector<f64>, covariance: &DMatrix<f64>) -> Option<Self> {
        let cholesky = covariance.clone().cholesky()?;
        let log_det = 2.0
            * cholesky
                .l_dirty()
                .diagonal()
                .iter()
                .map(|d| d.ln())
                .sum::<f64>();
        if !log_det.is_finite() {
            return None;
        }

        let dim = mean.len() as f64;
        Some(Self {
            mean: mean.clone(),
            cholesky,
            log_norm: -0.5 * (dim * (2.0 * std::f64::consts::PI).ln() + log_det),
        })
    }

    fn log_pdf(&self, sample: &DVector<f64>) -> f64 {
        let diff = sample - &self.mean;
        let solved = self.cholesky.solve(&diff);
        self.log_norm - 0.5 * diff.dot(&solved)
    }
}
