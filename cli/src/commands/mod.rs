// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the AMEM CLI

pub mod config;
pub mod fit;
pub mod predict;

pub use self::config::ConfigCommand;
pub use self::fit::FitArgs;
pub use self::predict::PredictArgs;
