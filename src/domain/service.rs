//! Service domain types
//!
//! Defines discovered services and why a candidate was left out.

use std::fmt;
use std::path::PathBuf;

/// A service directory found under the services root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Directory name (e.g., "Backend", "Auth")
    pub name: String,
    /// Service directory; migration tool commands run here
    pub root_path: PathBuf,
    /// The single project descriptor (e.g., `Backend.csproj`)
    pub descriptor_path: PathBuf,
    /// Whether the descriptor references the migration tooling package
    pub declares_migration_tooling: bool,
}

/// Why a candidate directory is not migration-eligible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    NoDescriptor,
    MultipleDescriptors(Vec<String>),
    UnreadableDescriptor(String),
    MissingToolingMarker,
}

impl ExclusionReason {
    /// Zero or several descriptors is an anomaly worth a warning;
    /// a plain project without migration tooling is expected.
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, Self::MissingToolingMarker)
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDescriptor => f.write_str("no project descriptor found"),
            Self::MultipleDescriptors(files) => {
                write!(f, "multiple project descriptors ({})", files.join(", "))
            }
            Self::UnreadableDescriptor(message) => {
                write!(f, "project descriptor unreadable: {}", message)
            }
            Self::MissingToolingMarker => f.write_str("no migration tooling dependency"),
        }
    }
}

/// A candidate that discovery left out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedService {
    pub name: String,
    pub root_path: PathBuf,
    pub reason: ExclusionReason,
}

/// Result of one discovery scan
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub eligible: Vec<ServiceDescriptor>,
    pub excluded: Vec<ExcludedService>,
}

impl DiscoveryReport {
    pub fn eligible_names(&self) -> Vec<&str> {
        self.eligible.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn excluded(&self, name: &str) -> Option<&ExcludedService> {
        self.excluded.iter().find(|s| s.name == name)
    }
}

/// Check descriptor contents for any of the tooling markers.
///
/// Matches on the package name as it appears in `PackageReference Include="..."`,
/// case-insensitively, so version or attribute order never matters.
pub fn declares_tooling(descriptor_contents: &str, markers: &[String]) -> bool {
    let contents = descriptor_contents.to_ascii_lowercase();
    markers
        .iter()
        .any(|marker| contents.contains(&marker.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["Microsoft.EntityFrameworkCore.Design".to_string()]
    }

    #[test]
    fn test_declares_tooling() {
        let csproj = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <ItemGroup>
    <PackageReference Include="Microsoft.EntityFrameworkCore.Design" Version="9.0.0" />
  </ItemGroup>
</Project>"#;
        assert!(declares_tooling(csproj, &markers()));
    }

    #[test]
    fn test_declares_tooling_case_insensitive() {
        let csproj = r#"<PackageReference Include="microsoft.entityframeworkcore.design" />"#;
        assert!(declares_tooling(csproj, &markers()));
    }

    #[test]
    fn test_runtime_package_alone_is_not_tooling() {
        let csproj = r#"<PackageReference Include="Microsoft.EntityFrameworkCore.SqlServer" />"#;
        assert!(!declares_tooling(csproj, &markers()));
    }

    #[test]
    fn test_exclusion_reason_anomaly() {
        assert!(ExclusionReason::NoDescriptor.is_anomaly());
        assert!(ExclusionReason::MultipleDescriptors(vec!["a".into(), "b".into()]).is_anomaly());
        assert!(!ExclusionReason::MissingToolingMarker.is_anomaly());
    }
}
