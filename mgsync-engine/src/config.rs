use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_REFERENCE_GENOME: &str = "reference";

fn default_reference_genome() -> String {
    DEFAULT_REFERENCE_GENOME.to_string()
}

///
/// Project configuration, usually read from a `.toml` file:
///
/// ```toml
/// reference_genome = "hg38"
/// parallel = true
/// threads = 4
///
/// [chromosomes]
/// chr1 = 248956422
/// chr2 = 242193529
/// ```
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SyncConfig {
    #[serde(default = "default_reference_genome")]
    pub reference_genome: String,
    /// Synchronize chromosomes on a rayon pool
    #[serde(default)]
    pub parallel: bool,
    /// Size of a dedicated pool; the global rayon pool is used when unset.
    /// Requires `parallel`.
    pub threads: Option<usize>,
    /// Reference chromosome lengths
    #[serde(default)]
    pub chromosomes: BTreeMap<String, u64>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            reference_genome: default_reference_genome(),
            parallel: false,
            threads: None,
            chromosomes: BTreeMap::new(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncConfigError {
    #[error("Number of threads must be at least 1")]
    InvalidThreads,
    #[error("A thread count is only used with parallel = true")]
    ThreadsWithoutParallel,
    #[error("Reference genome name must not be empty")]
    EmptyReferenceGenome,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type SyncConfigResult<T> = std::result::Result<T, SyncConfigError>;

impl SyncConfig {
    pub fn validate(&self) -> SyncConfigResult<()> {
        if self.threads == Some(0) {
            return Err(SyncConfigError::InvalidThreads);
        }
        if self.threads.is_some() && !self.parallel {
            return Err(SyncConfigError::ThreadsWithoutParallel);
        }
        if self.reference_genome.trim().is_empty() {
            return Err(SyncConfigError::EmptyReferenceGenome);
        }
        Ok(())
    }
}

impl TryFrom<&Path> for SyncConfig {
    type Error = SyncConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: SyncConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

impl std::str::FromStr for SyncConfig {
    type Err = SyncConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: SyncConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
