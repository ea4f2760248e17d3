//! Runtime tool path resolution
//!
//! For each external tool (`docker`, `dotnet`) we:
//! 1. Check for an environment variable `{TOOL}_BIN` (e.g., `DOTNET_BIN`)
//! 2. Fall back to PATH-based invocation if the envvar is not set
//!
//! `locate` is used for the startup preflight so a missing binary is reported
//! once, up front, instead of as a spawn failure for every service.

use std::env;
use std::path::PathBuf;

/// Get the path to an external tool
///
/// Checks for an environment variable `{TOOL}_BIN` (uppercase tool name + "_BIN").
/// Falls back to the tool name itself if the envvar is not set, which relies on PATH.
///
/// ```rust,ignore
/// // With DOTNET_BIN="/usr/share/dotnet/dotnet"
/// assert_eq!(get_tool_path("dotnet"), "/usr/share/dotnet/dotnet");
///
/// // Without DOTNET_BIN set
/// assert_eq!(get_tool_path("dotnet"), "dotnet");
/// ```
pub fn get_tool_path(tool: &str) -> String {
    let env_var = format!("{}_BIN", tool.to_uppercase());
    env::var(&env_var).unwrap_or_else(|_| tool.to_string())
}

/// Resolve a tool to an executable on disk, if it can be found
pub fn locate(tool: &str) -> Option<PathBuf> {
    which::which(get_tool_path(tool)).ok()
}

/// Tool names used by stackrun
pub mod tools {
    pub const DOCKER: &str = "docker";
    pub const DOTNET: &str = "dotnet";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_tool_path_from_env() {
        env::set_var("STACKRUN_TEST_TOOL_BIN", "/custom/path/to/tool");
        assert_eq!(get_tool_path("stackrun_test_tool"), "/custom/path/to/tool");
        env::remove_var("STACKRUN_TEST_TOOL_BIN");
    }

    #[test]
    fn test_get_tool_path_fallback() {
        env::remove_var("MISSING_TOOL_BIN");
        assert_eq!(get_tool_path("missing-tool"), "missing-tool");
    }

    #[test]
    fn test_locate_missing_tool() {
        assert!(locate("definitely-not-a-real-tool-4b2e").is_none());
    }
}
