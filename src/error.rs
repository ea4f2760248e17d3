//! Centralized error types for stackrun
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Top-level error type for stackrun operations
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse config {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to read {path}: {message}")]
    ReadFailed { path: String, message: String },
}

/// Container lifecycle errors
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Failed to spawn `{command}`: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: String },
}

/// Errors that abort a whole discovery scan (not a single candidate)
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Services root not found: {path}")]
    RootNotFound { path: String },

    #[error("Failed to read services root {path}: {message}")]
    ReadFailed { path: String, message: String },
}

/// Per-service migration errors
///
/// Every variant is local to one service and never aborts the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    #[error("No connection string for {service} (tried {})", tried_keys.join(", "))]
    CredentialMissing {
        service: String,
        tried_keys: Vec<String>,
    },

    #[error("Could not probe migration state for {service}: {reason}")]
    ProbeFailure { service: String, reason: String },

    #[error("Failed to create migration {migration} for {service}: {reason}")]
    CreateFailure {
        service: String,
        migration: String,
        reason: String,
    },

    #[error("Failed to apply migrations for {service}: {reason}")]
    ApplyFailure { service: String, reason: String },

    #[error("Skipping {service}: {detail}")]
    DiscoveryAnomaly { service: String, detail: String },
}

impl MigrationError {
    /// Pipeline phase the error was raised in
    pub fn phase(&self) -> &'static str {
        match self {
            Self::CredentialMissing { .. } => "resolve",
            Self::ProbeFailure { .. } => "probe",
            Self::CreateFailure { .. } => "generate",
            Self::ApplyFailure { .. } => "apply",
            Self::DiscoveryAnomaly { .. } => "discover",
        }
    }

    /// Service the error belongs to
    pub fn service(&self) -> &str {
        match self {
            Self::CredentialMissing { service, .. }
            | Self::ProbeFailure { service, .. }
            | Self::CreateFailure { service, .. }
            | Self::ApplyFailure { service, .. }
            | Self::DiscoveryAnomaly { service, .. } => service,
        }
    }
}

/// A failed migration tool invocation
///
/// `command` and `output` must already be masked by the adapter that
/// produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{command}` {status}: {output}")]
pub struct ToolFailure {
    pub command: String,
    pub status: String,
    pub output: String,
}

impl ToolFailure {
    pub fn new(
        command: impl Into<String>,
        status: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            status: status.into(),
            output: output.into(),
        }
    }
}
