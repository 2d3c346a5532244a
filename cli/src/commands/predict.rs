// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `amem predict` - train a service, optionally extend its memory, answer a query

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use amem_core::application::build_service;
use amem_core::domain::config::AmemConfig;
use amem_core::domain::MemoryState;

use crate::data::{load_matrix, parse_vector};

#[derive(Args)]
pub struct PredictArgs {
    /// JSON matrix of training samples
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    /// Number of mixture components
    #[arg(short = 'k', long)]
    pub components: usize,

    /// Query vector, comma separated (e.g. "0.5,1.0")
    #[arg(short, long, allow_hyphen_values = true)]
    pub query: String,

    /// JSON matrix of extra points stored in memory after training
    #[arg(long, value_name = "FILE")]
    pub update: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub prediction: Vec<f64>,
    pub converged: bool,
    pub n_iterations: usize,
    pub memory: MemoryState,
}

pub fn execute(args: PredictArgs, config_override: Option<PathBuf>) -> Result<()> {
    let mut config = AmemConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;

    let data = load_matrix(&args.data)?;
    if config.memory.embedding_dim != data.ncols() {
        info!(
            configured = config.memory.embedding_dim,
            data = data.ncols(),
            "Embedding dimension follows the training data"
        );
        config.memory.embedding_dim = data.ncols();
    }

    let report = run(&config, &args, &data)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn run(
    config: &AmemConfig,
    args: &PredictArgs,
    data: &nalgebra::DMatrix<f64>,
) -> Result<PredictionReport> {
    let service = build_service(config)?;
    service
        .train(data, args.components)
        .context("Training failed")?;

    if let Some(path) = &args.update {
        let new_points = load_matrix(path)?;
        service
            .update_memory(&new_points)
            .context("Memory update failed")?;
    }

    let query = parse_vector(&args.query)?;
    let prediction = service.predict(&query).context("Prediction failed")?;
    let params = service
        .model_parameters()
        .context("Model parameters missing after training")?;

    Ok(PredictionReport {
        prediction: prediction.iter().copied().collect(),
        converged: params.converged,
        n_iterations: params.n_iterations,
        memory: service.get_memory_state(),
    })
}
