// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// A retrieved (key, value) pair annotated with its similarity to the query.
///
/// The similarity only means something for the retrieval that produced it;
/// the store itself keeps bare key/value pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub key: DVector<f64>,
    pub value: DVector<f64>,
    pub similarity: f64,
}

/// Point-in-time snapshot of the associative memory, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryState {
    pub size: usize,
    pub capacity: usize,
    pub embedding_dim: usize,
    pub is_trained: bool,
}

/// Cosine similarity (`1 - cosine distance`) of two equal-length vectors.
///
/// Defined as 0.0 when either operand is the zero vector so that no NaN ever
/// reaches a similarity sort. Each operand is scaled by its largest magnitude
/// first, so norms of very small or very large vectors stay representable.
pub fn cosine_similarity(a: &DVector<f64>, b: &DVector<f64>) -> f64 {
    let (a_max, b_max) = (a.amax(), b.amax());
    if a_max == 0.0 || b_max == 0.0 {
        return 0.0;
    }
    let a = a / a_max;
    let b = b / b_max;

    let similarity = a.dot(&b) / (a.norm() * b.norm());
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}
