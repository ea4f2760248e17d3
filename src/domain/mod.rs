//! Domain layer - pure business logic
//!
//! This module contains business logic with no external I/O.
//! Types and functions here can be unit tested without mocking.

pub mod connection;
pub mod migration;
pub mod service;

// Re-export commonly used types
pub use connection::ConnectionSpec;
pub use migration::{
    ArtifactNaming, Clock, MigrationDecision, MigrationOutcome, PassReport, PendingChanges,
    SystemClock,
};
pub use service::{DiscoveryReport, ExcludedService, ExclusionReason, ServiceDescriptor};
