// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Caller-contract errors raised by the fitter, the memory store and the service.
//!
//! Numerical degeneracies (singular covariance, zero mixture density, zero total
//! similarity, zero-norm vectors) are never reported here; each has a defined
//! fallback value at the point where it is detected.

use std::fmt;
use thiserror::Error;

/// Which vector failed the embedding dimension check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorRole {
    Key,
    Value,
    Query,
    TrainingData,
}

impl fmt::Display for VectorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VectorRole::Key => "Key",
            VectorRole::Value => "Value",
            VectorRole::Query => "Query",
            VectorRole::TrainingData => "Training data",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmemError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{role} dimension {actual} doesn't match expected {expected}")]
    DimensionMismatch {
        role: VectorRole,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot update: no entries in memory")]
    EmptyStore,

    #[error("Model must be trained before this operation")]
    NotTrained,
}

impl AmemError {
    pub fn dimension(role: VectorRole, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { role, expected, actual }
    }
}

pub type AmemResult<T> = Result<T, AmemError>;
