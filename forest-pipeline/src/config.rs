use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use color_eyre::Result;
use color_eyre::eyre::Context;
use crowd_rforest::aggregate::EncoderPolicy;
use crowd_rforest::query::ClampRanges;
use serde::{Deserialize, Serialize};

/// Settings shared by the pipeline tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding `trees/` and `forests/`.
    pub model_dir: PathBuf,
    /// JSON file backing the state store. Relative paths are resolved
    /// against `model_dir`.
    pub state_file: PathBuf,
    pub clamp: ClampRanges,
    pub encoder_policy: EncoderPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            state_file: PathBuf::from("state.json"),
            clamp: ClampRanges::default(),
            encoder_policy: EncoderPolicy::default(),
        }
    }
}

impl PipelineConfig {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Malformed config file {}", path.display()))
    }

    pub fn state_path(&self) -> PathBuf {
        self.model_dir.join(&self.state_file)
    }
}

/// Command-line options common to every tool. Flags override the config
/// file.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// JSON config file
    #[arg(short = 'c', long = "config", value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Model directory
    #[arg(short = 'm', long = "model-dir", value_name = "MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// State file
    #[arg(long = "state-file", value_name = "STATE_FILE")]
    pub state_file: Option<PathBuf>,
}

impl CommonArgs {
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::read(path)?,
            None => PipelineConfig::default(),
        };

        if let Some(dir) = &self.model_dir {
            config.model_dir = dir.clone();
        }
        if let Some(file) = &self.state_file {
            config.state_file = file.clone();
        }

        Ok(config)
    }
}
