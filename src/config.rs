//! Sorter configuration.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Column defaults follow the registration sheet layout the sorter was built
//! around: names in D and E, rating in L, age in O, requests in P, and the
//! team number written back to A.
//!
//! ```
//! use team_sorter::config::SorterConfig;
//!
//! let config = SorterConfig::from_toml_str(r#"
//!     teams = 4
//!     seed = 7
//!
//!     [columns]
//!     rating = "Skill"
//! "#).unwrap();
//!
//! assert_eq!(config.teams, Some(4));
//! assert_eq!(config.trials, 1000);
//! assert_eq!(config.columns.rating, "Skill");
//! assert_eq!(config.columns.first_name, "D");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::column::{self, ColumnError};
use crate::loader::Columns;
use crate::search::{SearchParams, DEFAULT_TRIALS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SorterConfig {
    /// Number of teams; may also be given on the command line.
    pub teams: Option<usize>,
    pub trials: usize,
    /// Random seed for reproducible sorts.
    pub seed: Option<u64>,
    /// Run trials on the rayon thread pool.
    pub parallel: bool,
    pub columns: ColumnConfig,
}

impl Default for SorterConfig {
    fn default() -> Self {
        SorterConfig {
            teams: None,
            trials: DEFAULT_TRIALS,
            seed: None,
            parallel: false,
            columns: ColumnConfig::default(),
        }
    }
}

/// Column references: a letter (`D`), a 0-based index (`3`) or a header label.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ColumnConfig {
    pub first_name: String,
    pub last_name: String,
    pub rating: String,
    pub age: String,
    pub request: String,
    /// Where the assigned team number is written.
    pub team: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            first_name: "D".into(),
            last_name: "E".into(),
            rating: "L".into(),
            age: "O".into(),
            request: "P".into(),
            team: "A".into(),
        }
    }
}

impl ColumnConfig {
    /// Resolves the input columns against the sheet header.
    pub fn resolve<S: AsRef<str>>(&self, header: Option<&[S]>) -> Result<Columns, ColumnError> {
        Ok(Columns {
            first_name: column::resolve(&self.first_name, header)?,
            last_name: column::resolve(&self.last_name, header)?,
            rating: column::resolve(&self.rating, header)?,
            age: column::resolve(&self.age, header)?,
            request: column::resolve(&self.request, header)?,
        })
    }

    pub fn team_column<S: AsRef<str>>(&self, header: Option<&[S]>) -> Result<usize, ColumnError> {
        column::resolve(&self.team, header)
    }
}

impl SorterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, contains invalid TOML, or
    /// fails [`SorterConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SorterConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.teams == Some(0) {
            return Err(ConfigError::Invalid("teams must be at least 1".into()));
        }
        if self.trials == 0 {
            return Err(ConfigError::Invalid("trials must be at least 1".into()));
        }
        Ok(())
    }

    pub fn with_teams(mut self, teams: usize) -> Self {
        self.teams = Some(teams);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl From<&SorterConfig> for SearchParams {
    fn from(config: &SorterConfig) -> Self {
        SearchParams {
            trials: config.trials,
            seed: config.seed,
            parallel: config.parallel,
        }
    }
}
