pub mod sty;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use versemark_syntax::{MarkerCatalog, TokenizerOptions};

pub use sty::{StyError, parse_sty};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read style sheet at {stylesheet_path}: {source}")]
    StylesheetReadError {
        stylesheet_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse style sheet at {stylesheet_path}: {source}")]
    StylesheetParseError {
        stylesheet_path: PathBuf,
        source: StyError,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// USFM style sheet to read marker metadata from. The built-in catalog
    /// is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<PathBuf>,
    /// Treat any collected error as a failure.
    pub strict: bool,
    /// Treat `¶` as whitespace.
    pub pilcrow_whitespace: bool,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the style sheet path
        config.stylesheet = config
            .stylesheet
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/versemark");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Marker metadata from the configured style sheet, or the built-in
    /// catalog.
    pub fn catalog(&self) -> Result<MarkerCatalog, ConfigError> {
        let Some(stylesheet_path) = &self.stylesheet else {
            return Ok(MarkerCatalog::builtin());
        };
        let content = std::fs::read_to_string(stylesheet_path).map_err(|source| {
            ConfigError::StylesheetReadError {
                stylesheet_path: stylesheet_path.clone(),
                source,
            }
        })?;
        let catalog = parse_sty(&content).map_err(|source| ConfigError::StylesheetParseError {
            stylesheet_path: stylesheet_path.clone(),
            source,
        })?;
        log::info!(
            "loaded {} marker kinds from {}",
            catalog.len(),
            stylesheet_path.display()
        );
        Ok(catalog)
    }

    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            pilcrow_whitespace: self.pilcrow_whitespace,
        }
    }

    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
