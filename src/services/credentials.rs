//! Credential resolver
//!
//! Finds a service's connection string in the injected [`EnvSource`] and
//! rewrites the container host alias so tools running on the host can reach
//! the database.

use tracing::debug;

use crate::config::MigrationSettings;
use crate::domain::ConnectionSpec;
use crate::error::MigrationError;
use crate::infrastructure::EnvSource;

/// Resolves connection strings per service
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    env: EnvSource,
    fallback_key: String,
    host_aliases: Vec<String>,
    host_rewrite_target: String,
}

impl CredentialResolver {
    pub fn new(env: EnvSource, settings: &MigrationSettings) -> Self {
        Self {
            env,
            fallback_key: settings.fallback_key.clone(),
            host_aliases: settings.host_aliases.clone(),
            host_rewrite_target: settings.host_rewrite_target.clone(),
        }
    }

    /// Keys consulted for `service`, most specific first
    pub fn candidate_keys(&self, service: &str) -> Vec<String> {
        let upper = service.to_uppercase();
        vec![
            format!("{}Db", upper),
            format!("ConnectionStrings__{}Db", service),
            format!("{}_CONNECTION_STRING", upper),
            self.fallback_key.clone(),
        ]
    }

    /// Resolve the connection for `service`.
    ///
    /// Empty values count as absent. When nothing is found the error lists
    /// every key that was tried.
    pub fn resolve(&self, service: &str) -> Result<ConnectionSpec, MigrationError> {
        let keys = self.candidate_keys(service);

        for key in &keys {
            let Some(value) = self.env.lookup(key) else {
                continue;
            };
            let spec = ConnectionSpec::new(
                key.as_str(),
                value,
                &self.host_aliases,
                &self.host_rewrite_target,
            );
            if spec.is_empty() {
                debug!(service, key = %key, "Ignoring empty connection string");
                continue;
            }
            debug!(
                service,
                key = %key,
                connection = %spec.masked(),
                rewritten = spec.resolved_host_alias().unwrap_or("-"),
                "Resolved connection string"
            );
            return Ok(spec);
        }

        Err(MigrationError::CredentialMissing {
            service: service.to_string(),
            tried_keys: keys,
        })
    }
}
