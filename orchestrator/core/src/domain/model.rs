// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Gaussian Mixture Parameters
//!
//! Value objects produced by the EM fitter.
//!
//! | Type | Shape |
//! |------|-------|
//! | `ModelParameters::means` | `n_components` × `DVector(n_features)` |
//! | `ModelParameters::covariances` | `n_components` × `DMatrix(n_features, n_features)` |
//! | `ModelParameters::weights` | `DVector(n_components)` |
//! | [`ResponsibilityMatrix`] | `DMatrix(n_samples, n_components)` |
//!
//! A fresh `ModelParameters` is built by every call to `fit` and never mutated
//! afterwards; the service keeps the most recent one.

use nalgebra::{DMatrix, DVector};

/// Posterior probability of each component (columns) for each sample (rows).
pub type ResponsibilityMatrix = DMatrix<f64>;

/// Fitted Gaussian mixture state.
///
/// # Invariants
///
/// - `means`, `covariances` and `weights` have the same length.
/// - Weights are non-negative and sum to 1 whenever at least one sample
///   received probability mass.
/// - Covariances are symmetric; fitted ones carry a `1e-6 · I` regularizer.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub means: Vec<DVector<f64>>,
    pub covariances: Vec<DMatrix<f64>>,
    pub weights: DVector<f64>,
    pub converged: bool,
    pub n_iterations: usize,
}

impl ModelParameters {
    pub fn n_components(&self) -> usize {
        self.means.len()
    }

    pub fn n_features(&self) -> usize {
        self.means.first().map(|m| m.len()).unwrap_or(0)
    }

    /// Index and value of the mean closest to `query` by Euclidean distance.
    /// First index wins on ties.
    pub fn nearest_mean(&self, query: &DVector<f64>) -> Option<(usize, &DVector<f64>)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, mean) in self.means.iter().enumerate() {
            let distance = (query - mean).norm();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((idx, distance)),
            }
        }
        best.map(|(idx, _)| (idx, &self.means[idx]))
    }

    /// The parameters with the fitter's iteration bookkeeping filled in.
    pub fn with_progress(mut self, converged: bool, n_iterations: usize) -> Self {
        self.converged = converged;
        self.n_iterations = n_iterations;
        self
    }
}
