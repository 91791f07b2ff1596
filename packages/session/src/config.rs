//! Session configuration: TOML file, then environment overrides.

use std::path::{Path, PathBuf};

use sasv_predict_models::ForestParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the dataset.
pub const DEFAULT_DATA_PATH: &str = "data/MUERTES_VIALES.csv";
/// Default interface the server binds to.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `PORT` is not a port number.
    #[error("Invalid PORT '{0}'")]
    InvalidPort(String),
}

/// Everything a session needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the semicolon-delimited dataset.
    pub data_path: PathBuf,
    /// Interface the server binds to.
    pub bind_addr: String,
    /// Port the server listens on.
    pub port: u16,
    /// Predictor training parameters.
    pub forest: ForestParams,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            forest: ForestParams::default(),
        }
    }
}

impl SessionConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies `SASV_DATA_PATH`, `BIND_ADDR` and `PORT` from `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `PORT` does not parse.
    pub fn with_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup("SASV_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        Ok(self)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] if `PORT` does not parse.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Loads the config file at `path` if given (defaults otherwise), then
    /// applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or invalid, or an
    /// override does not parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                log::debug!("Reading config from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.with_env()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.data_path, PathBuf::from("data/MUERTES_VIALES.csv"));
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.seed, 42);
        assert_eq!(config.forest.top_k, 5);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            data_path = "/srv/sasv/muertes.csv"

            [forest]
            n_trees = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/srv/sasv/muertes.csv"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.forest.n_trees, 25);
        assert_eq!(config.forest.min_classes, 10);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(matches!(
            SessionConfig::from_toml_str("port = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn environment_overrides() {
        let env: BTreeMap<&str, &str> = [
            ("SASV_DATA_PATH", "/tmp/data.csv"),
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
        ]
        .into_iter()
        .collect();

        let config = SessionConfig::default()
            .with_env_from(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.data_path, PathBuf::from("/tmp/data.csv"));
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn invalid_port_override() {
        let result = SessionConfig::default()
            .with_env_from(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidPort(p)) if p == "http"));
    }

    #[test]
    fn missing_config_file() {
        let path = std::env::temp_dir().join("sasv_session_missing_config.toml");
        assert!(matches!(
            SessionConfig::from_file(&path),
            Err(ConfigError::Read { .. })
        ));
    }
}
