//! CLI configuration management

use lfvm_interpreter::Revision;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::CliError;

/// CLI configuration, read from `~/.lfvm/config.toml` unless `--config`
/// points elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Protocol revision used by `run`
    #[serde(default)]
    pub revision: Revision,
    /// Gas given to `run` when `--gas` is absent
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Decode with super-instructions
    #[serde(default = "default_true")]
    pub fusion: bool,
    /// Keep 1/64 of the gas in the caller on nested calls
    #[serde(default = "default_true")]
    pub all_but_one_64th: bool,
    /// Maximum call depth
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Dictionary file used by `dict` when `--file` is absent
    #[serde(default)]
    pub dictionary: Option<PathBuf>,
}

fn default_gas_limit() -> u64 {
    10_000_000
}

fn default_true() -> bool {
    true
}

fn default_max_call_depth() -> usize {
    1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            revision: Revision::default(),
            gas_limit: default_gas_limit(),
            fusion: true,
            all_but_one_64th: true,
            max_call_depth: default_max_call_depth(),
            dictionary: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".lfvm"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Save to `path`, or to the default location when `None`
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, CliError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()
                .ok_or_else(|| CliError::Config("Cannot determine config path".to_string()))?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Interpreter settings derived from this configuration
    pub fn interpreter(&self) -> lfvm_interpreter::Config {
        lfvm_interpreter::Config {
            revision: self.revision,
            fusion: self.fusion,
            all_but_one_64th: self.all_but_one_64th,
            max_call_depth: self.max_call_depth,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.revision, Revision::London);
        assert_eq!(config.gas_limit, 10_000_000);
        assert!(config.fusion);
        assert!(config.dictionary.is_none());
    }

    #[test]
    fn test_config_serialize() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("revision = \"london\""));
        assert!(toml.contains("gas_limit"));
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            revision = "berlin"
            fusion = false
            dictionary = "/tmp/contracts.dict"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.revision, Revision::Berlin);
        assert!(!config.fusion);
        assert_eq!(config.gas_limit, 10_000_000);
        assert_eq!(config.dictionary, Some(PathBuf::from("/tmp/contracts.dict")));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "revision = 7").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            revision: Revision::Shanghai,
            gas_limit: 42,
            ..Default::default()
        };
        config.save(Some(&path)).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_interpreter_config() {
        let config = Config {
            fusion: false,
            max_call_depth: 8,
            ..Default::default()
        };
        let evm = config.interpreter();
        assert!(!evm.fusion);
        assert_eq!(evm.max_call_depth, 8);
        assert_eq!(evm.revision, Revision::London);
    }
}
