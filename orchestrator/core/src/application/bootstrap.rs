// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Service Bootstrap - Application Layer
//!
//! Composition root: builds the concrete fitter and memory store from
//! configuration and injects them into [`AmemService`]. The domain layer only
//! sees the traits; this is the one place that names the implementations.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wires configuration to concrete components

use std::sync::Arc;

use crate::application::amem_service::AmemService;
use crate::domain::config::{AmemConfig, EmConfig, MemoryConfig};
use crate::domain::repository::{ExpectationMaximizer, MemoryStore};
use crate::infrastructure::{GaussianMixtureFitter, InMemoryAssociativeStore};

/// Creates the associative memory described by `config`
pub fn create_memory_store(config: &MemoryConfig) -> Arc<dyn MemoryStore> {
    Arc::new(InMemoryAssociativeStore::from_config(config))
}

/// Creates the EM fitter described by `config`
pub fn create_expectation_maximizer(config: &EmConfig) -> Arc<dyn ExpectationMaximizer> {
    Arc::new(GaussianMixtureFitter::from_config(config))
}

/// Validates `config` and assembles a ready-to-train service
pub fn build_service(config: &AmemConfig) -> anyhow::Result<AmemService> {
    config.validate()?;

    tracing::debug!(
        capacity = config.memory.capacity,
        embedding_dim = config.memory.embedding_dim,
        max_iterations = config.em.max_iterations,
        tolerance = config.em.tolerance,
        seeded = config.em.seed.is_some(),
        "Building AMEM service"
    );

    Ok(AmemService::new(
        create_memory_store(&config.memory),
        create_expectation_maximizer(&config.em),
    ))
}
