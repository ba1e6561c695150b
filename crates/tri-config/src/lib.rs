//! # tri-config
//!
//! Layered configuration loading for the triathlon query engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TRI_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.tri/config.toml`
//! 4. User-level `~/.config/tri/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TRI_ENGINE__MAX_ATTEMPTS` -> `engine.max_attempts`,
//! `TRI_LLM__API_KEY` -> `llm.api_key`, etc. When `llm.api_key` is still empty
//! after all layers, the conventional `OPENAI_API_KEY` variable is used.
//!
//! # Usage
//!
//! ```no_run
//! use tri_config::TriConfig;
//!
//! let config = TriConfig::load_with_dotenv().expect("config");
//!
//! if config.llm.is_configured() {
//!     println!("model: {}", config.llm.model);
//! }
//! ```

mod audit;
mod engine;
mod error;
mod llm;
mod warehouse;

pub use audit::{AuditBackend, AuditConfig};
pub use engine::{EngineConfig, SelectionFallback};
pub use error::ConfigError;
pub use llm::LlmConfig;
pub use warehouse::WarehouseConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TriConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl TriConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `extra` above the project file.
    pub fn load_from(extra: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config: Self = Self::figment_with(extra).extract()?;
        if config.llm.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                config.llm.api_key = key;
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the workspace root before
    /// building the figment. This is the typical entry point for the CLI.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        Self::figment_with(None)
    }

    fn figment_with(extra: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".tri/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit file
        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("TRI_").split("__"))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .check()
            .map_err(|(field, reason)| ConfigError::InvalidValue {
                field: field.to_string(),
                reason,
            })
    }

    /// Require the LLM section before building a live model client.
    pub fn require_llm(&self) -> Result<&LlmConfig, ConfigError> {
        if self.llm.is_configured() {
            Ok(&self.llm)
        } else {
            Err(ConfigError::NotConfigured {
                section: "llm".to_string(),
            })
        }
    }

    /// Copy with secrets masked, for `tri config`.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            llm: self.llm.redacted(),
            ..self.clone()
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tri").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a `.env`
    /// file, then falls back to the current directory. Silently does nothing
    /// if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
