//! Migration domain types
//!
//! Decisions, outcomes and artifact naming for a migration pass.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::error::MigrationError;

/// Tool-reported state of the model relative to the latest artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChanges {
    /// The model differs from the latest migration
    Changes,
    /// The model matches the latest migration
    NoChanges,
    /// The tool could not tell (invocation error, no schema context, ...)
    Indeterminate(String),
}

/// What the prober decided for one service in one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationDecision {
    NoneNeeded,
    CreateInitial,
    CreateIncremental(DateTime<Utc>),
    Blocked(String),
}

impl MigrationDecision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoneNeeded => "none-needed",
            Self::CreateInitial => "create-initial",
            Self::CreateIncremental(_) => "create-incremental",
            Self::Blocked(_) => "blocked",
        }
    }
}

impl fmt::Display for MigrationDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateIncremental(at) => write!(f, "{} ({})", self.label(), at.to_rfc3339()),
            Self::Blocked(reason) => write!(f, "{} ({})", self.label(), reason),
            _ => f.write_str(self.label()),
        }
    }
}

/// Naming rules for generated artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    /// Canonical name of the first migration
    pub initial_name: String,
    /// Prefix of time-stamped incremental migrations
    pub incremental_prefix: String,
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self {
            initial_name: "InitialCreate".to_string(),
            incremental_prefix: "Auto".to_string(),
        }
    }
}

impl ArtifactNaming {
    /// Name of the artifact to create for `decision`, if it needs one.
    ///
    /// Incremental names carry a second-resolution UTC timestamp so repeated
    /// passes from the interactive loop never collide.
    pub fn name_for(&self, decision: &MigrationDecision) -> Option<String> {
        match decision {
            MigrationDecision::CreateInitial => Some(self.initial_name.clone()),
            MigrationDecision::CreateIncremental(at) => Some(format!(
                "{}_{}",
                self.incremental_prefix,
                at.format("%Y%m%d%H%M%S")
            )),
            MigrationDecision::NoneNeeded | MigrationDecision::Blocked(_) => None,
        }
    }
}

/// Source of "now" for incremental artifact names
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of running the pipeline for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub service: String,
    /// `Blocked` when credentials were missing or the probe was inconclusive
    pub decision: Option<MigrationDecision>,
    pub created: bool,
    pub applied: bool,
    pub error: Option<MigrationError>,
}

impl MigrationOutcome {
    /// Outcome for a service that never got past a phase
    pub fn failed(service: impl Into<String>, decision: Option<MigrationDecision>, error: MigrationError) -> Self {
        Self {
            service: service.into(),
            decision,
            created: false,
            applied: false,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.applied
    }
}

/// All outcomes of one orchestration pass
#[derive(Debug, Clone)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub outcomes: Vec<MigrationOutcome>,
}

impl PassReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            pass_id: Uuid::new_v4(),
            started_at,
            duration: Duration::ZERO,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, service: &str) -> Option<&MigrationOutcome> {
        self.outcomes.iter().find(|o| o.service == service)
    }
}
