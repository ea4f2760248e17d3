//! # Stack Configuration
//!
//! Optional `stackrun.yaml` at the project root. Every field has a default,
//! so a project with the conventional layout needs no file at all:
//!
//! ```yaml
//! services_dir: services
//! env_file: .env
//! compose:
//!   files: [docker-compose.yml, docker-compose.dev.yml]
//!   volume: mssqldata
//! migrations:
//!   fallback_key: CONNECTION_STRING
//!   host_aliases: [mssql, postgres]
//! ```
//!
//! CLI flags override `services_dir` and `env_file`.

mod migration;
mod stack;

pub use migration::MigrationSettings;
pub use stack::ComposeSettings;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default config file name, looked up in the project root
pub const CONFIG_FILE: &str = "stackrun.yaml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    /// Directory holding one subdirectory per service (relative to project root)
    #[serde(default = "default_services_dir")]
    pub services_dir: PathBuf,

    /// key=value file loaded into the environment source (relative to project root)
    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    #[serde(default)]
    pub compose: ComposeSettings,

    #[serde(default)]
    pub migrations: MigrationSettings,
}

fn default_services_dir() -> PathBuf {
    PathBuf::from("services")
}

fn default_env_file() -> PathBuf {
    PathBuf::from(".env")
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            services_dir: default_services_dir(),
            env_file: default_env_file(),
            compose: ComposeSettings::default(),
            migrations: MigrationSettings::default(),
        }
    }
}

impl StackConfig {
    /// Load configuration for a project.
    ///
    /// An explicit path must exist. Without one, `{project_root}/stackrun.yaml`
    /// is used when present and defaults otherwise.
    pub fn load(project_root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                let path = resolve(project_root, path);
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                path
            }
            None => {
                let path = project_root.join(CONFIG_FILE);
                if !path.exists() {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE);
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|message| ConfigError::ParseError {
            path: path.display().to_string(),
            message,
        })
    }

    fn from_yaml(content: &str) -> Result<Self, String> {
        // An empty file deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Absolute services root for `project_root`
    pub fn services_root(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.services_dir)
    }

    /// Absolute env file path for `project_root`
    pub fn env_file_path(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.env_file)
    }
}

fn resolve(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StackConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.services_dir, PathBuf::from("services"));
        assert_eq!(config.services_root(dir.path()), dir.path().join("services"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StackConfig::load(dir.path(), Some(Path::new("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "services_dir: src/services\ncompose:\n  files: [compose.yml]\nmigrations:\n  migrations_dir: Data/Migrations\n",
        )
        .unwrap();

        let config = StackConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.services_dir, PathBuf::from("src/services"));
        assert_eq!(config.compose.files, vec!["compose.yml"]);
        assert_eq!(config.compose.volume.as_deref(), Some("mssqldata"));
        assert_eq!(config.migrations.migrations_dir, "Data/Migrations");
        assert_eq!(config.env_file_path(dir.path()), dir.path().join(".env"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "\n").unwrap();
        let config = StackConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "services_dir: [unclosed\n").unwrap();
        let err = StackConfig::load(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
