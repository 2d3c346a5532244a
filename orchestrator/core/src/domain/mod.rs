// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # AMEM Domain Layer
//!
//! Pure types and contracts. No I/O apart from configuration file loading.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`model`] | `ModelParameters`, `ResponsibilityMatrix` |
//! | [`memory`] | `MemoryEntry`, `MemoryState`, `cosine_similarity` |
//! | [`repository`] | `ExpectationMaximizer`, `MemoryStore` traits |
//! | [`error`] | `AmemError`, `VectorRole` |
//! | [`config`] | `AmemConfig`, `MemoryConfig`, `EmConfig` |

pub mod config;
pub mod error;
pub mod memory;
pub mod model;
pub mod repository;

pub use config::*;
pub use error::*;
pub use memory::*;
pub use model::*;
pub use repository::*;
