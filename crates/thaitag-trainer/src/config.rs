//! Training configuration, stored next to the weights so a model directory
//! carries everything needed to rebuild the reader and the network.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thaitag_core::ReaderConfig;

/// Network dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub embedding_dim: usize,
    pub hidden_dim: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 100,
            hidden_dim: 128,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub reader: ReaderConfig,
    pub model: ModelConfig,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for per-epoch shuffling
    pub seed: u64,
    /// Log running loss every this many batches (0 disables)
    pub log_every: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            reader: ReaderConfig::default(),
            model: ModelConfig::default(),
            epochs: 10,
            batch_size: 16,
            learning_rate: 1e-3,
            seed: 42,
            log_every: 100,
        }
    }
}

impl TrainerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trainer config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse trainer config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("failed to write trainer config {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.batch_size > 0, "batch_size must be positive");
        anyhow::ensure!(
            self.model.embedding_dim > 0 && self.model.hidden_dim > 0,
            "model dimensions must be positive"
        );
        anyhow::ensure!(self.learning_rate > 0.0, "learning_rate must be positive");
        self.reader.validate()?;
        Ok(())
    }
}
