//! Analysis configuration, loaded from TOML.
//!
//! ```toml
//! initial_balance = 10000.0
//!
//! [graph]
//! depth = 3
//! hide_orphans = false
//!
//! [related]
//! max_hops = 1
//!
//! [filter]
//! symbols = ["EURUSD"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradelens_core::filter::TradeFilter;

use crate::graph::GraphDepth;

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("initial_balance must be a finite number, got {0}")]
    InvalidBalance(f64),
}

/// Everything an analysis run needs besides the trades themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub initial_balance: f64,
    pub graph: GraphConfig,
    pub related: RelatedConfig,
    /// Applied before any metric is computed. Empty keeps every trade.
    pub filter: TradeFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Serialized as the level number, 1..=3.
    pub depth: GraphDepth,
    pub hide_orphans: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedConfig {
    /// BFS hop limit for related-trade queries.
    pub max_hops: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            graph: GraphConfig::default(),
            related: RelatedConfig::default(),
            filter: TradeFilter::default(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            depth: GraphDepth::Dates,
            hide_orphans: false,
        }
    }
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self { max_hops: 1 }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string. Missing keys take their defaults.
    ///
    /// An out-of-range `[graph] depth` is rejected by the parser.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_balance.is_finite() {
            return Err(ConfigError::InvalidBalance(self.initial_balance));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
