use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration module
/// This module holds the run configuration assembled from the command line
/// and validated before the driver starts.
/// Translation backend kind
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Direct HTTP API
    #[default]
    Api,
    // @provider: Subprocess coding agent
    Agent,
}

impl ProviderKind {
    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Api => "api".to_string(),
            Self::Agent => "agent".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "agent" => Ok(Self::Agent),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Represents the run configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Input document path
    pub input: PathBuf,

    /// Output document path
    pub output: PathBuf,

    /// Optional model identifier forwarded to the provider
    #[serde(default)]
    pub model: Option<String>,

    /// Max characters per translation batch; also bounds piece length
    #[serde(default = "default_max_batch_chars")]
    pub max_batch_chars: usize,

    /// Checkpoint state path override
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Progress log path override
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Whether resuming from an existing checkpoint is allowed
    #[serde(default = "default_resume")]
    pub resume: bool,

    /// Translation backend
    #[serde(default)]
    pub provider: ProviderKind,
}

fn default_max_batch_chars() -> usize {
    5000
}

fn default_resume() -> bool {
    true
}

impl Config {
    /// Checkpoint path: override or `<output>.state.json`.
    pub fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .unwrap_or_else(|| append_suffix(&self.output, ".state.json"))
    }

    /// Progress log path: override or `<output>.progress.log`.
    pub fn progress_log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| append_suffix(&self.output, ".progress.log"))
    }

    /// Validate the configuration before running.
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_chars == 0 {
            return Err(anyhow!("max_batch_chars must be greater than zero"));
        }
        if self.input == self.output {
            return Err(anyhow!("input and output paths must differ"));
        }
        Ok(())
    }
}

fn append_suffix(path: &PathBuf, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
