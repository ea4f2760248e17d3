//! Migration service - runs a migration pass over every discovered service
//!
//! Per service: resolve credentials → probe → generate → apply. Services run
//! one at a time in discovery order; a failure is recorded in that service's
//! outcome and the pass moves on.

use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

use super::applier::MigrationApplier;
use super::credentials::CredentialResolver;
use super::discovery::ServiceDiscovery;
use super::generator::MigrationGenerator;
use super::prober::MigrationProber;
use crate::config::MigrationSettings;
use crate::domain::{
    ArtifactNaming, Clock, MigrationDecision, MigrationOutcome, PassReport,
    ServiceDescriptor, SystemClock,
};
use crate::error::MigrationError;
use crate::infrastructure::MigrationTool;

/// Orchestrates migration passes
pub struct MigrationService<T: MigrationTool, K: Clock = SystemClock> {
    tool: T,
    clock: K,
    resolver: CredentialResolver,
    discovery: ServiceDiscovery,
    naming: ArtifactNaming,
    list_after_apply: bool,
}

impl<T: MigrationTool> MigrationService<T, SystemClock> {
    /// Create a migration service on the wall clock
    pub fn new(tool: T, resolver: CredentialResolver, settings: &MigrationSettings) -> Self {
        Self {
            tool,
            clock: SystemClock,
            resolver,
            discovery: ServiceDiscovery::new(settings),
            naming: settings.artifact_naming(),
            list_after_apply: settings.list_after_apply,
        }
    }
}

impl<T: MigrationTool, K: Clock> MigrationService<T, K> {
    /// Replace the clock used for incremental migration names
    pub fn with_clock<C: Clock>(self, clock: C) -> MigrationService<T, C> {
        MigrationService {
            tool: self.tool,
            clock,
            resolver: self.resolver,
            discovery: self.discovery,
            naming: self.naming,
            list_after_apply: self.list_after_apply,
        }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Run one independent pass.
    ///
    /// Always returns; every eligible service gets exactly one outcome.
    pub async fn run_migration_pass(&self, services_root: &Path) -> PassReport {
        let start = Instant::now();
        let mut report = PassReport::new(self.clock.now());

        let discovered = match self.discovery.discover(services_root) {
            Ok(discovered) => discovered,
            Err(e) => {
                error!("Migration pass aborted before any service ran: {}", e);
                report.duration = start.elapsed();
                return report;
            }
        };

        info!(
            "Running migrations for {} service(s) ({} skipped)",
            discovered.eligible.len(),
            discovered.excluded.len()
        );

        for service in discovered
            .eligible
            .iter()
            .filter(|s| s.declares_migration_tooling)
        {
            let outcome = self.migrate_service(service).await;
            report.outcomes.push(outcome);
        }

        report.duration = start.elapsed();
        info!(
            "Migration pass finished in {:.1}s: {} succeeded, {} failed",
            report.duration.as_secs_f64(),
            report.succeeded(),
            report.failed()
        );
        report
    }

    /// Run the pipeline for a single service
    pub async fn migrate_service(&self, service: &ServiceDescriptor) -> MigrationOutcome {
        let tool: &dyn MigrationTool = &self.tool;

        // The resolver never returns an empty value, so nothing empty reaches apply
        let connection = match self.resolver.resolve(&service.name) {
            Ok(connection) => connection,
            Err(error) => {
                warn!(service = %service.name, phase = error.phase(), "{}", error);
                let decision = MigrationDecision::Blocked(error.to_string());
                return MigrationOutcome::failed(&service.name, Some(decision), error);
            }
        };

        info!(
            service = %service.name,
            connection = %connection.masked(),
            "Running migrations"
        );

        let decision = MigrationProber::new(tool, &self.clock)
            .probe(service, &connection)
            .await;

        if let MigrationDecision::Blocked(reason) = &decision {
            let error = MigrationError::ProbeFailure {
                service: service.name.clone(),
                reason: reason.clone(),
            };
            warn!(service = %service.name, phase = error.phase(), "{}", error);
            return MigrationOutcome::failed(&service.name, Some(decision), error);
        }

        let generation = MigrationGenerator::new(tool, &self.naming)
            .generate(service, &decision, &connection)
            .await;

        if !generation.created() {
            let error = generation
                .into_error()
                .unwrap_or_else(|| MigrationError::CreateFailure {
                    service: service.name.clone(),
                    migration: self.naming.name_for(&decision).unwrap_or_default(),
                    reason: "migration was not created".to_string(),
                });
            return MigrationOutcome::failed(&service.name, Some(decision), error);
        }

        let applied = MigrationApplier::new(tool)
            .with_listing(self.list_after_apply)
            .apply(service, &connection)
            .await;

        match applied {
            Ok(()) => {
                info!(service = %service.name, "Migrations applied");
                MigrationOutcome {
                    service: service.name.clone(),
                    decision: Some(decision),
                    created: true,
                    applied: true,
                    error: None,
                }
            }
            Err(error) => MigrationOutcome {
                service: service.name.clone(),
                decision: Some(decision),
                created: true,
                applied: false,
                error: Some(error),
            },
        }
    }
}
