// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod associative_store;
pub mod gaussian_mixture;

pub use associative_store::InMemoryAssociativeStore;
pub use gaussian_mixture::{GaussianMixtureFitter, COVARIANCE_REGULARIZATION};
