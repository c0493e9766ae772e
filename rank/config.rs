use crate::scorer::{PriorityCombination, RawScoreGeneScorer};
use crate::types::ModeOfInheritance;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Settings for one scoring run, stored as TOML.
///
/// ```toml
/// mode_of_inheritance = "AUTOSOMAL_RECESSIVE"
/// priority_combination = "product"
/// parallel = true
/// threads = 8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub mode_of_inheritance: ModeOfInheritance,
    pub priority_combination: PriorityCombination,
    /// Score genes on the rayon pool. Ranking is always single-threaded.
    pub parallel: bool,
    /// Size of a dedicated scoring pool. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode_of_inheritance: ModeOfInheritance::Uninitialized,
            priority_combination: PriorityCombination::Product,
            parallel: true,
            threads: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML config file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("Thread count must be at least 1.")]
    ZeroThreads,
    #[error("Failed to build the scoring thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl ScoringConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let toml_string = fs::read_to_string(path)?;
        Self::from_toml_str(&toml_string)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == Some(0) {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    pub fn scorer(&self) -> RawScoreGeneScorer {
        let scorer = RawScoreGeneScorer::new(self.priority_combination);
        if self.parallel {
            scorer
        } else {
            scorer.sequential()
        }
    }

    /// A dedicated pool when `threads` is set; otherwise scoring uses the global pool.
    pub fn thread_pool(&self) -> Result<Option<rayon::ThreadPool>, ConfigError> {
        self.validate()?;
        match self.threads {
            Some(threads) if self.parallel => Ok(Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|index| format!("generank-score-{index}"))
                    .build()?,
            )),
            Some(_) | None => Ok(None),
        }
    }
}
