// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// AMEM Configuration Types
//
// Scalar settings for the two core components:
// - memory: capacity and embedding dimension of the associative store
// - em: iteration budget, convergence tolerance and optional seed of the fitter
//
// Loaded from YAML with discovery and environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_PATH_ENV: &str = "AMEM_CONFIG_PATH";

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AmemConfig {
    /// Associative memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Expectation-Maximization settings
    #[serde(default)]
    pub em: EmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum number of stored entries before FIFO eviction
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Required length of every key, value and query vector
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmConfig {
    /// Upper bound on EM iterations per fit
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Minimum log-likelihood improvement to keep iterating
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Seed for mean initialization. Unset means OS entropy (non-reproducible fits).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

impl Default for EmConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: None,
        }
    }
}

impl AmemConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. AMEM_CONFIG_PATH environment variable
    /// 2. ./amem-config.yaml (working directory)
    /// 3. ~/.amem/config.yaml (user home)
    /// 4. /etc/amem/config.yaml (Unix only)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./amem-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".amem").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/amem/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must load
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// injectable variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "AMEM_MEMORY_CAPACITY", &mut self.memory.capacity);
        override_from(&lookup, "AMEM_EMBEDDING_DIM", &mut self.memory.embedding_dim);
        override_from(&lookup, "AMEM_EM_MAX_ITERATIONS", &mut self.em.max_iterations);
        override_from(&lookup, "AMEM_EM_TOLERANCE", &mut self.em.tolerance);

        if let Some(raw) = lookup("AMEM_EM_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => {
                    tracing::info!("Environment override: AMEM_EM_SEED={}", seed);
                    self.em.seed = Some(seed);
                }
                Err(_) => {
                    tracing::warn!("Invalid value for AMEM_EM_SEED: '{}'. Ignoring.", raw);
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.memory.capacity == 0 {
            anyhow::bail!("memory.capacity must be positive");
        }

        if self.memory.embedding_dim == 0 {
            anyhow::bail!("memory.embedding_dim must be positive");
        }

        if self.em.max_iterations == 0 {
            anyhow::bail!("em.max_iterations must be positive");
        }

        if !self.em.tolerance.is_finite() || self.em.tolerance <= 0.0 {
            anyhow::bail!(
                "em.tolerance must be a positive finite number, got {}",
                self.em.tolerance
            );
        }

        Ok(())
    }
}

fn override_from<F, T>(lookup: &F, name: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            tracing::info!("Environment override: {}={}", name, value);
            *target = value;
        }
        Err(_) => {
            tracing::warn!("Invalid value for {}: '{}'. Ignoring.", name, raw);
        }
    }
}

fn default_capacity() -> usize {
    1000
}

fn default_embedding_dim() -> usize {
    128
}

fn default_max_iterations() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-6
}
