// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Loading of sample matrices and query vectors from the command line.
//!
//! Matrices are JSON arrays of equal-length rows: `[[1.0, 2.0], [3.0, 4.0]]`.
//! Query vectors are comma-separated numbers: `1.0,2.0`.

use anyhow::{Context, Result};
use nalgebra::{DMatrix, DVector};
use std::path::Path;

/// Read a JSON matrix file; rows are samples.
pub fn load_matrix(path: impl AsRef<Path>) -> Result<DMatrix<f64>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {:?}", path))?;
    parse_matrix(&content).with_context(|| format!("Invalid data file {:?}", path))
}

pub fn parse_matrix(json: &str) -> Result<DMatrix<f64>> {
    let rows: Vec<Vec<f64>> = serde_json::from_str(json).context("Expected a JSON array of rows")?;

    let Some(first) = rows.first() else {
        anyhow::bail!("Data contains no rows");
    };
    let n_features = first.len();
    if n_features == 0 {
        anyhow::bail!("Rows must contain at least one value");
    }
    if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
        anyhow::bail!(
            "Row {} has {} values, expected {}",
            idx,
            row.len(),
            n_features
        );
    }

    Ok(DMatrix::from_row_iterator(
        rows.len(),
        n_features,
        rows.into_iter().flatten(),
    ))
}

pub fn parse_vector(raw: &str) -> Result<DVector<f64>> {
    let values = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid number '{}' in vector", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DVector::from_vec(values))
}
