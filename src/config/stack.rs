//! Container stack configuration.

use serde::{Deserialize, Serialize};

/// docker compose invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeSettings {
    /// Compose files passed with `-f`, in order
    #[serde(default = "default_compose_files")]
    pub files: Vec<String>,

    /// Named volume created before `up` (skipped when unset)
    #[serde(default = "default_volume")]
    pub volume: Option<String>,

    /// Pass `--build` to `up`
    #[serde(default = "default_build")]
    pub build: bool,
}

fn default_compose_files() -> Vec<String> {
    vec![
        "docker-compose.yml".to_string(),
        "docker-compose.dev.yml".to_string(),
    ]
}

fn default_volume() -> Option<String> {
    Some("mssqldata".to_string())
}

fn default_build() -> bool {
    true
}

impl Default for ComposeSettings {
    fn default() -> Self {
        Self {
            files: default_compose_files(),
            volume: default_volume(),
            build: default_build(),
        }
    }
}
