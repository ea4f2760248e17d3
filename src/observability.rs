//! # Pass Observability
//!
//! Structured events for migration passes and stack lifecycle, printed as JSON
//! on stdout with a `STACKRUN_EVENT:` prefix so a log shipper can pick them
//! out of regular output. Enabled with `--events` / `STACKRUN_EVENTS=true`.
//!
//! Events only ever carry masked connection data: outcomes hold error text
//! that the tool adapter has already scrubbed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{MigrationOutcome, PassReport};

/// Event prefix for log collectors to identify structured events
const EVENT_PREFIX: &str = "STACKRUN_EVENT:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum StackEvent {
    /// Container stack started, stopped or restarted
    StackLifecycle(StackLifecycleEvent),
    /// One service finished its pipeline successfully
    ServiceMigrated(ServiceMigratedEvent),
    /// One service failed somewhere in its pipeline
    ServiceMigrationFailed(ServiceMigrationFailedEvent),
    /// A whole pass finished
    PassCompleted(PassCompletedEvent),
}

/// Common fields for pass events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Timestamp in RFC3339 format
    pub timestamp: String,
    pub pass_id: String,
}

impl EventMetadata {
    pub fn for_pass(report: &PassReport) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            pass_id: report.pass_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackLifecycleEvent {
    pub timestamp: String,
    pub action: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMigratedEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,
    pub service: String,
    pub decision: String,
    pub created: bool,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMigrationFailedEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    pub phase: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassCompletedEvent {
    #[serde(flatten)]
    pub metadata: EventMetadata,
    pub services: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_secs: f64,
}

/// Emit a structured event to stdout
pub fn emit_event(event: &StackEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            println!("{}{}", EVENT_PREFIX, json);
        }
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
        }
    }
}

/// Build the events describing one pass: one per outcome, then a summary
pub fn pass_events(report: &PassReport) -> Vec<StackEvent> {
    let metadata = EventMetadata::for_pass(report);
    let mut events: Vec<StackEvent> = report
        .outcomes
        .iter()
        .map(|outcome| outcome_event(metadata.clone(), outcome))
        .collect();

    events.push(StackEvent::PassCompleted(PassCompletedEvent {
        metadata,
        services: report.outcomes.len(),
        succeeded: report.succeeded(),
        failed: report.failed(),
        duration_secs: report.duration.as_secs_f64(),
    }));
    events
}

fn outcome_event(metadata: EventMetadata, outcome: &MigrationOutcome) -> StackEvent {
    let decision = outcome.decision.as_ref().map(|d| d.label().to_string());
    match &outcome.error {
        None => StackEvent::ServiceMigrated(ServiceMigratedEvent {
            metadata,
            service: outcome.service.clone(),
            decision: decision.unwrap_or_default(),
            created: outcome.created,
            applied: outcome.applied,
        }),
        Some(error) => StackEvent::ServiceMigrationFailed(ServiceMigrationFailedEvent {
            metadata,
            service: outcome.service.clone(),
            decision,
            phase: error.phase().to_string(),
            error: error.to_string(),
        }),
    }
}

/// Emit every event for a finished pass
pub fn emit_pass_report(report: &PassReport) {
    for event in pass_events(report) {
        emit_event(&event);
    }
}

/// Emit a stack lifecycle event
pub fn emit_lifecycle(action: &str, error: Option<String>) {
    emit_event(&StackEvent::StackLifecycle(StackLifecycleEvent {
        timestamp: Utc::now().to_rfc3339(),
        action: action.to_string(),
        success: error.is_none(),
        error,
    }));
}
