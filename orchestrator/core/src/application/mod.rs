// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod amem_service;
pub mod bootstrap;

pub use amem_service::{AmemService, PREDICTION_NEIGHBOURS};
pub use bootstrap::{build_service, create_expectation_maximizer, create_memory_store};
