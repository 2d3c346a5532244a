// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tests for the Gaussian mixture fitter.
//!
//! Data sets are drawn from seeded ChaCha generators so every run sees the same
//! samples; the structural invariants (weights, component count, iteration
//! bound) are additionally checked over random inputs with proptest.

use amem_core::domain::{AmemError, ExpectationMaximizer};
use amem_core::infrastructure::GaussianMixtureFitter;
use nalgebra::{DMatrix, DVector};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// `per_cluster` samples around each centre with the given spread.
fn clustered_data(centres: &[[f64; 2]], per_cluster: usize, spread: f64, seed: u64) -> DMatrix<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let rows = centres.len() * per_cluster;
    let mut data = DMatrix::zeros(rows, 2);
    for (c, centre) in centres.iter().enumerate() {
        for j in 0..per_cluster {
            let row = c * per_cluster + j;
            for d in 0..2 {
                let noise: f64 = rng.sample(StandardNormal);
                data[(row, d)] = centre[d] + spread * noise;
            }
        }
    }
    data
}

#[test]
fn test_fit_separates_well_spaced_clusters() {
    let data = clustered_data(&[[-1.5, -1.5], [1.5, 1.5]], 40, 0.2, 17);

    // A few seeds: any one may start both means on the same side
    let fitted = (0..5u64)
        .map(|seed| {
            GaussianMixtureFitter::new(200, 1e-8)
                .with_seed(seed)
                .fit(&data, 2)
                .unwrap()
        })
        .find(|params| {
            let near = |target: [f64; 2]| {
                params
                    .means
                    .iter()
                    .any(|m| (m - DVector::from_row_slice(&target)).norm() < 0.3)
            };
            near([-1.5, -1.5]) && near([1.5, 1.5])
        });

    let params = fitted.expect("no seed recovered both clusters");
    assert!((params.weights.sum() - 1.0).abs() < 1e-9);
    for weight in params.weights.iter() {
        assert!((weight - 0.5).abs() < 0.05);
    }
    assert!(params.converged);
}

#[test]
fn test_fitted_covariances_are_symmetric_positive_definite() {
    let data = clustered_data(&[[0.0, 0.0], [2.0, -1.0], [-2.0, 1.0]], 25, 0.5, 3);
    let params = GaussianMixtureFitter::new(100, 1e-6)
        .with_seed(8)
        .fit(&data, 3)
        .unwrap();

    for covariance in &params.covariances {
        assert_eq!(covariance.shape(), (2, 2));
        assert!((covariance[(0, 1)] - covariance[(1, 0)]).abs() < 1e-12);
        assert!(covariance.clone().cholesky().is_some());
    }
}

#[test]
fn test_log_likelihood_does_not_decrease_across_steps() {
    let data = clustered_data(&[[-1.0, 0.0], [1.0, 0.5]], 30, 0.4, 21);
    let fitter = GaussianMixtureFitter::new(1, 1e-6).with_seed(2);

    let mut params = fitter.fit(&data, 2).unwrap();
    let mut previous = fitter.log_likelihood(&data, &params);
    for _ in 0..20 {
        let responsibilities = fitter.expectation_step(&data, &params);
        params = fitter.maximization_step(&data, &responsibilities);
        let current = fitter.log_likelihood(&data, &params);
        assert!(current >= previous - 1e-3, "{current} < {previous}");
        previous = current;
    }
}

#[test]
fn test_fit_rejects_invalid_input() {
    let fitter = GaussianMixtureFitter::new(10, 1e-6);
    assert!(matches!(
        fitter.fit(&DMatrix::zeros(0, 3), 1),
        Err(AmemError::InvalidInput(_))
    ));
    assert!(matches!(
        fitter.fit(&DMatrix::zeros(4, 3), 0),
        Err(AmemError::InvalidInput(_))
    ));
}

#[test]
fn test_fit_on_identical_samples() {
    // Zero scatter leaves only the regularizer on the diagonal
    let data = DMatrix::from_element(6, 2, 1.0);
    let params = GaussianMixtureFitter::new(50, 1e-6)
        .with_seed(4)
        .fit(&data, 2)
        .unwrap();

    assert!((params.weights.sum() - 1.0).abs() < 1e-9);
    for covariance in &params.covariances {
        assert!(covariance.clone().cholesky().is_some());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_fit_invariants(
        rows in prop::collection::vec(prop::collection::vec(-5.0f64..5.0, 2), 4..30),
        n_components in 1usize..4,
        max_iterations in 1usize..40,
        seed in any::<u64>(),
    ) {
        let n_samples = rows.len();
        let data = DMatrix::from_row_iterator(n_samples, 2, rows.into_iter().flatten());
        let params = GaussianMixtureFitter::new(max_iterations, 1e-6)
            .with_seed(seed)
            .fit(&data, n_components)
            .unwrap();

        prop_assert_eq!(params.n_components(), n_components);
        prop_assert_eq!(params.covariances.len(), n_components);
        prop_assert_eq!(params.weights.len(), n_components);
        prop_assert!(params.n_iterations >= 1);
        prop_assert!(params.n_iterations <= max_iterations);
        if !params.converged {
            prop_assert_eq!(params.n_iterations, max_iterations);
        }
        prop_assert!(params.weights.iter().all(|w| *w >= 0.0));
        prop_assert!((params.weights.sum() - 1.0).abs() < 1e-6);
    }
}
