//! Services layer - orchestration logic
//!
//! This module coordinates between domain logic and infrastructure.
//! Services use infrastructure adapters to perform I/O operations.

pub mod applier;
pub mod credentials;
pub mod discovery;
pub mod generator;
pub mod migration_service;
pub mod prober;

#[cfg(test)]
pub mod testing;

// Re-export commonly used types
pub use credentials::CredentialResolver;
pub use discovery::ServiceDiscovery;
pub use migration_service::MigrationService;
