//! Service discovery
//!
//! Scans the immediate subdirectories of the services root once and splits
//! them into migration-eligible services and excluded candidates.

use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::MigrationSettings;
use crate::domain::service::declares_tooling;
use crate::domain::{DiscoveryReport, ExcludedService, ExclusionReason, ServiceDescriptor};
use crate::error::{DiscoveryError, MigrationError};

/// Directories that are never services
const IGNORED_DIRS: &[&str] = &["bin", "obj", "node_modules"];

/// Finds migration-capable services
#[derive(Debug, Clone)]
pub struct ServiceDiscovery {
    descriptor_extension: String,
    tooling_markers: Vec<String>,
}

impl ServiceDiscovery {
    pub fn new(settings: &MigrationSettings) -> Self {
        Self {
            descriptor_extension: settings.descriptor_extension.clone(),
            tooling_markers: settings.tooling_markers.clone(),
        }
    }

    /// Scan `services_root`.
    ///
    /// Only an unreadable root is an error; every problem with a single
    /// candidate ends up in `excluded`. Candidates are sorted by name.
    pub fn discover(&self, services_root: &Path) -> Result<DiscoveryReport, DiscoveryError> {
        if !services_root.is_dir() {
            return Err(DiscoveryError::RootNotFound {
                path: services_root.display().to_string(),
            });
        }

        let entries = std::fs::read_dir(services_root).map_err(|e| DiscoveryError::ReadFailed {
            path: services_root.display().to_string(),
            message: e.to_string(),
        })?;

        let mut candidates: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') || IGNORED_DIRS.contains(&name.as_str()) {
                    None
                } else {
                    Some((name, entry.path()))
                }
            })
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));

        let mut report = DiscoveryReport::default();
        for (name, path) in candidates {
            match self.inspect(&name, &path) {
                Ok(descriptor) => {
                    debug!(service = %name, descriptor = %descriptor.descriptor_path.display(), "Service is migration-eligible");
                    report.eligible.push(descriptor);
                }
                Err(reason) => {
                    if reason.is_anomaly() {
                        let anomaly = MigrationError::DiscoveryAnomaly {
                            service: name.clone(),
                            detail: reason.to_string(),
                        };
                        warn!(service = %name, phase = anomaly.phase(), "{}", anomaly);
                    } else {
                        debug!(service = %name, "Skipping: {}", reason);
                    }
                    report.excluded.push(ExcludedService {
                        name,
                        root_path: path,
                        reason,
                    });
                }
            }
        }

        Ok(report)
    }

    fn inspect(&self, name: &str, path: &Path) -> Result<ServiceDescriptor, ExclusionReason> {
        let descriptors = self.descriptors_in(path);

        let descriptor_path = match descriptors.as_slice() {
            [] => return Err(ExclusionReason::NoDescriptor),
            [single] => single.clone(),
            many => {
                return Err(ExclusionReason::MultipleDescriptors(
                    many.iter()
                        .filter_map(|p| p.file_name())
                        .map(|f| f.to_string_lossy().to_string())
                        .collect(),
                ))
            }
        };

        let contents = std::fs::read_to_string(&descriptor_path)
            .map_err(|e| ExclusionReason::UnreadableDescriptor(e.to_string()))?;

        if !declares_tooling(&contents, &self.tooling_markers) {
            return Err(ExclusionReason::MissingToolingMarker);
        }

        Ok(ServiceDescriptor {
            name: name.to_string(),
            root_path: path.to_path_buf(),
            descriptor_path,
            declares_migration_tooling: true,
        })
    }

    /// Top-level `*.{ext}` files in `dir`
    fn descriptors_in(&self, dir: &Path) -> Vec<PathBuf> {
        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&dir.to_string_lossy()),
            self.descriptor_extension
        );
        let mut found: Vec<PathBuf> = match glob::glob(&pattern) {
            Ok(paths) => paths
                .filter_map(|p| p.ok())
                .filter(|p| p.is_file())
                .collect(),
            Err(e) => {
                warn!("Invalid descriptor pattern {}: {}", pattern, e);
                Vec::new()
            }
        };
        found.sort();
        found
    }
}
