//! Migration and credential configuration.

use serde::{Deserialize, Serialize};

use crate::domain::ArtifactNaming;

/// How services are discovered, resolved and migrated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Project descriptor extension looked up in each service directory
    #[serde(default = "default_descriptor_extension")]
    pub descriptor_extension: String,

    /// Package names that mark a project as migration-capable
    #[serde(default = "default_tooling_markers")]
    pub tooling_markers: Vec<String>,

    /// Migration artifact directory (relative to the service root)
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Canonical name of the first migration
    #[serde(default = "default_initial_name")]
    pub initial_name: String,

    /// Prefix for time-stamped incremental migrations
    #[serde(default = "default_incremental_prefix")]
    pub incremental_prefix: String,

    /// Shared key used when no service-scoped key is set
    #[serde(default = "default_fallback_key")]
    pub fallback_key: String,

    /// Container hostnames that are not reachable from the host
    #[serde(default = "default_host_aliases")]
    pub host_aliases: Vec<String>,

    /// Host-reachable replacement for the aliases above
    #[serde(default = "default_host_rewrite_target")]
    pub host_rewrite_target: String,

    /// Log `migrations list` after a successful apply (extra tool call per service)
    #[serde(default)]
    pub list_after_apply: bool,
}

fn default_descriptor_extension() -> String {
    "csproj".to_string()
}

fn default_tooling_markers() -> Vec<String> {
    vec![
        "Microsoft.EntityFrameworkCore.Design".to_string(),
        "Microsoft.EntityFrameworkCore.Tools".to_string(),
    ]
}

fn default_migrations_dir() -> String {
    "Migrations".to_string()
}

fn default_initial_name() -> String {
    "InitialCreate".to_string()
}

fn default_incremental_prefix() -> String {
    "Auto".to_string()
}

fn default_fallback_key() -> String {
    "CONNECTION_STRING".to_string()
}

fn default_host_aliases() -> Vec<String> {
    vec!["mssql".to_string(), "postgres".to_string()]
}

fn default_host_rewrite_target() -> String {
    "localhost".to_string()
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            descriptor_extension: default_descriptor_extension(),
            tooling_markers: default_tooling_markers(),
            migrations_dir: default_migrations_dir(),
            initial_name: default_initial_name(),
            incremental_prefix: default_incremental_prefix(),
            fallback_key: default_fallback_key(),
            host_aliases: default_host_aliases(),
            host_rewrite_target: default_host_rewrite_target(),
            list_after_apply: false,
        }
    }
}

impl MigrationSettings {
    pub fn artifact_naming(&self) -> ArtifactNaming {
        ArtifactNaming {
            initial_name: self.initial_name.clone(),
            incremental_prefix: self.incremental_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MigrationSettings::default();
        assert_eq!(settings.migrations_dir, "Migrations");
        assert_eq!(settings.fallback_key, "CONNECTION_STRING");
        assert_eq!(settings.host_aliases, vec!["mssql", "postgres"]);
        assert_eq!(settings.artifact_naming().initial_name, "InitialCreate");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: MigrationSettings =
            serde_yaml::from_str("fallback_key: DEFAULT_DB\nhost_aliases: [sqlserver]\n").unwrap();
        assert_eq!(settings.fallback_key, "DEFAULT_DB");
        assert_eq!(settings.host_aliases, vec!["sqlserver"]);
        assert_eq!(settings.descriptor_extension, "csproj");
        assert!(!settings.list_after_apply);
    }
}
