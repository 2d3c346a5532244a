// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `amem-core` — Associative-Memory-Enhanced EM
//!
//! Fits a Gaussian mixture with Expectation-Maximization and seeds a bounded
//! associative memory from the fitted components, so later queries are
//! answered by nearest-memory lookup with a nearest-mean fallback.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | parameters, memory entries, errors, traits, configuration |
//! | [`infrastructure`] | Infrastructure | `GaussianMixtureFitter`, `InMemoryAssociativeStore` |
//! | [`application`] | Application | `AmemService`, `build_service` composition root |
//!
//! All operations are synchronous and CPU-bound.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{build_service, AmemService};
pub use domain::*;
