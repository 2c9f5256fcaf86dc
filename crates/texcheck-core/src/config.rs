//! JSON configuration for an analysis.
//!
//! One document holds both halves; either may be left out:
//!
//! ```json
//! {
//!   "grammar": {
//!     "commands": [
//!       { "name": "todo", "argument_rule": { "mode": "phrase", "count": 1 } }
//!     ],
//!     "raw_environments": ["code"]
//!   },
//!   "rules": { "line_spacing": 2.0, "forbidden_fonts": ["Comic Sans MS"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use texcheck_rules::RuleConfig;
use texcheck_syntax::{GrammarError, GrammarRegistry, GrammarSpec};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Schemas added on top of the builtin grammar.
    pub grammar: GrammarSpec,
    pub rules: RuleConfig,
}

impl EngineConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "loaded config from {}: {} command and {} environment schema(s)",
            path.display(),
            config.grammar.commands.len(),
            config.grammar.environments.len()
        );
        Ok(config)
    }

    /// The builtin grammar with the configured schemas merged over it.
    pub fn registry(&self) -> Result<GrammarRegistry, ConfigError> {
        Ok(GrammarRegistry::builtin().merged(self.grammar.clone())?)
    }
}
