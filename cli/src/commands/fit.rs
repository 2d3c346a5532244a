// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `amem fit` - run EM on a data file and report the fitted mixture

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use amem_core::application::create_expectation_maximizer;
use amem_core::domain::config::AmemConfig;

use crate::data::load_matrix;

#[derive(Args)]
pub struct FitArgs {
    /// JSON matrix of samples (array of equal-length rows)
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    /// Number of mixture components
    #[arg(short = 'k', long)]
    pub components: usize,
}

pub fn execute(args: FitArgs, config_override: Option<PathBuf>) -> Result<()> {
    let config = AmemConfig::load_or_default(config_override)
        .context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    let data = load_matrix(&args.data)?;
    let fitter = create_expectation_maximizer(&config.em);

    let params = fitter
        .fit(&data, args.components)
        .context("EM fit failed")?;
    let log_likelihood = fitter.log_likelihood(&data, &params);

    let status = if params.converged {
        "converged".green()
    } else {
        "not converged".yellow()
    };
    println!(
        "{} {} after {} iteration(s)",
        "EM".bold(),
        status,
        params.n_iterations
    );
    println!("  Samples: {}  Features: {}", data.nrows(), data.ncols());
    println!("  Log-likelihood: {:.6}", log_likelihood);
    println!();

    for (idx, (mean, weight)) in params.means.iter().zip(params.weights.iter()).enumerate() {
        let coords: Vec<String> = mean.iter().map(|x| format!("{:.4}", x)).collect();
        println!(
            "  Component {}: weight {:.4}  mean [{}]",
            idx,
            weight,
            coords.join(", ")
        );
    }

    Ok(())
}
