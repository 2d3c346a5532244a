// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Contracts for the two leaf components the service is composed from.
//! Concrete implementations live in the infrastructure layer.

use nalgebra::{DMatrix, DVector};

use crate::domain::error::AmemResult;
use crate::domain::memory::MemoryEntry;
use crate::domain::model::{ModelParameters, ResponsibilityMatrix};

/// Fits a Gaussian mixture to a data matrix (rows are samples).
pub trait ExpectationMaximizer: Send + Sync {
    /// Run EM until the log-likelihood improvement drops below the tolerance
    /// or the iteration budget is spent.
    fn fit(&self, data: &DMatrix<f64>, n_components: usize) -> AmemResult<ModelParameters>;

    /// Responsibility matrix of shape (n_samples, n_components).
    fn expectation_step(&self, data: &DMatrix<f64>, parameters: &ModelParameters)
        -> ResponsibilityMatrix;

    /// Parameters re-estimated from responsibilities. Iteration bookkeeping is
    /// left at `converged = false`, `n_iterations = 0`.
    fn maximization_step(
        &self,
        data: &DMatrix<f64>,
        responsibilities: &ResponsibilityMatrix,
    ) -> ModelParameters;

    fn log_likelihood(&self, data: &DMatrix<f64>, parameters: &ModelParameters) -> f64;
}

/// Bounded key/value index over fixed-length vectors.
pub trait MemoryStore: Send + Sync {
    /// Append a pair, evicting the oldest entry once capacity is exceeded.
    fn store(&self, key: &DVector<f64>, value: &DVector<f64>) -> AmemResult<()>;

    /// Up to `k` entries ordered by descending cosine similarity to `query`.
    fn retrieve(&self, query: &DVector<f64>, k: usize) -> AmemResult<Vec<MemoryEntry>>;

    /// Replace the value of the entry whose key is most similar to `key`.
    fn update(&self, key: &DVector<f64>, value: &DVector<f64>) -> AmemResult<()>;

    fn clear(&self);

    fn size(&self) -> usize;

    fn capacity(&self) -> usize;

    fn embedding_dim(&self) -> usize;
}
