//! In-memory fakes for the migration tool, container runtime and clock.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::domain::{Clock, ConnectionSpec, PendingChanges, ServiceDescriptor};
use crate::error::{ContainerError, ToolFailure};
use crate::infrastructure::{ContainerRuntime, MigrationTool};

pub fn service(name: &str) -> ServiceDescriptor {
    let root = PathBuf::from("/srv/services").join(name);
    ServiceDescriptor {
        name: name.to_string(),
        descriptor_path: root.join(format!("{}.csproj", name)),
        root_path: root,
        declares_migration_tooling: true,
    }
}

pub fn connection() -> ConnectionSpec {
    ConnectionSpec::new(
        "CONNECTION_STRING",
        "Server=mssql;Database=AuthDb;User=sa;Password=pw;",
        &["mssql".to_string()],
        "localhost",
    )
}

/// Clock that only moves when told to
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()),
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::minutes(minutes);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
struct ToolState {
    artifacts: HashMap<String, Vec<String>>,
    pending: HashMap<String, PendingChanges>,
    create_failures: HashMap<String, ToolFailure>,
    apply_failures: HashMap<String, ToolFailure>,
    applied: HashMap<String, usize>,
    calls: Vec<String>,
    connections: Vec<String>,
}

/// Migration tool that keeps artifacts in memory.
///
/// Creating an artifact clears pending changes, like a real tool whose
/// snapshot now matches the model.
#[derive(Default)]
pub struct FakeMigrationTool {
    state: Mutex<ToolState>,
}

impl FakeMigrationTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_artifact(&self, service: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .artifacts
            .entry(service.to_string())
            .or_default()
            .push(name.to_string());
    }

    pub fn set_pending(&self, service: &str, pending: PendingChanges) {
        self.state
            .lock()
            .unwrap()
            .pending
            .insert(service.to_string(), pending);
    }

    pub fn fail_create(&self, service: &str, output: &str) {
        self.state.lock().unwrap().create_failures.insert(
            service.to_string(),
            ToolFailure::new("dotnet ef migrations add", "exited with code 1", output),
        );
    }

    pub fn fail_apply(&self, service: &str, output: &str) {
        self.state.lock().unwrap().apply_failures.insert(
            service.to_string(),
            ToolFailure::new("dotnet ef database update", "exited with code 1", output),
        );
    }

    pub fn artifacts(&self, service: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .artifacts
            .get(service)
            .cloned()
            .unwrap_or_default()
    }

    pub fn applied(&self, service: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .applied
            .get(service)
            .copied()
            .unwrap_or(0)
    }

    /// Number of calls whose label starts with `kind` (`pending`, `create`, `apply`, `list`)
    pub fn calls(&self, kind: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(kind))
            .count()
    }

    pub fn call_log(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Connection values handed to the tool
    pub fn connections(&self) -> Vec<String> {
        self.state.lock().unwrap().connections.clone()
    }

    fn record(&self, call: String, connection: &ConnectionSpec) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
            .connections
            .push(connection.resolved_value().to_string());
    }
}

#[async_trait]
impl MigrationTool for FakeMigrationTool {
    fn has_artifacts(&self, service: &ServiceDescriptor) -> bool {
        self.state
            .lock()
            .unwrap()
            .artifacts
            .get(&service.name)
            .map(|a| !a.is_empty())
            .unwrap_or(false)
    }

    async fn has_pending_model_changes(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> PendingChanges {
        self.record(format!("pending:{}", service.name), connection);
        self.state
            .lock()
            .unwrap()
            .pending
            .get(&service.name)
            .cloned()
            .unwrap_or(PendingChanges::NoChanges)
    }

    async fn create_artifact(
        &self,
        service: &ServiceDescriptor,
        name: &str,
        connection: &ConnectionSpec,
    ) -> Result<(), ToolFailure> {
        self.record(format!("create:{}:{}", service.name, name), connection);
        let mut state = self.state.lock().unwrap();
        if let Some(failure) = state.create_failures.get(&service.name) {
            return Err(failure.clone());
        }
        state
            .artifacts
            .entry(service.name.clone())
            .or_default()
            .push(name.to_string());
        state
            .pending
            .insert(service.name.clone(), PendingChanges::NoChanges);
        Ok(())
    }

    async fn apply_artifacts(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<(), ToolFailure> {
        self.record(format!("apply:{}", service.name), connection);
        let mut state = self.state.lock().unwrap();
        if let Some(failure) = state.apply_failures.get(&service.name) {
            return Err(failure.clone());
        }
        let count = state
            .artifacts
            .get(&service.name)
            .map(Vec::len)
            .unwrap_or(0);
        state.applied.insert(service.name.clone(), count);
        Ok(())
    }

    async fn list_artifacts(
        &self,
        service: &ServiceDescriptor,
        connection: &ConnectionSpec,
    ) -> Result<Vec<String>, ToolFailure> {
        self.record(format!("list:{}", service.name), connection);
        Ok(self.artifacts(&service.name))
    }

    fn reports_existing_artifact(&self, failure: &ToolFailure) -> bool {
        failure.output.contains("already exists") || failure.output.contains("existing migration")
    }
}

/// Container runtime that counts calls
#[derive(Default)]
pub struct FakeRuntime {
    starts: Mutex<usize>,
    stops: Mutex<usize>,
    fail_start: bool,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn starts(&self) -> usize {
        *self.starts.lock().unwrap()
    }

    pub fn stops(&self) -> usize {
        *self.stops.lock().unwrap()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn start_stack(&self) -> Result<(), ContainerError> {
        *self.starts.lock().unwrap() += 1;
        if self.fail_start {
            return Err(ContainerError::CommandFailed {
                command: "docker compose up -d".into(),
                status: "exit code 1".into(),
            });
        }
        Ok(())
    }

    async fn stop_stack(&self) -> Result<(), ContainerError> {
        *self.stops.lock().unwrap() += 1;
        Ok(())
    }
}
