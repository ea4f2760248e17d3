//! Environment source
//!
//! Loaded once at startup from a `.env` file with the process environment
//! layered on top, then passed by value into the credential resolver.
//! Nothing here writes back to the process environment.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Process environment as UTF-8 pairs; other entries are skipped
fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                debug!(
                    "Skipping non UTF-8 environment variable {}",
                    key.unwrap_or_else(|k| k.to_string_lossy().into_owned())
                );
                None
            }
        })
        .collect()
}

/// Read-only key/value lookup used for credential resolution
#[derive(Clone, Default)]
pub struct EnvSource {
    values: HashMap<String, String>,
    file_loaded: bool,
}

impl EnvSource {
    /// Load `path` (if present) and overlay the current process environment.
    ///
    /// Within the file the first occurrence of a key wins; a variable already
    /// set in the process environment wins over the file.
    pub fn load(path: &Path) -> Self {
        let file_pairs = match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded environment file {}", path.display());
                Some(parse_env_file(&content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Environment file {} not found; only process variables are available",
                    path.display()
                );
                None
            }
            Err(e) => {
                warn!("Failed to read environment file {}: {}", path.display(), e);
                None
            }
        };

        let file_loaded = file_pairs.is_some();
        let mut source = Self::from_layers(file_pairs.unwrap_or_default(), process_vars());
        source.file_loaded = file_loaded;
        source
    }

    /// Build from file pairs and process pairs (process wins)
    pub fn from_layers<F, P>(file_pairs: F, process_pairs: P) -> Self
    where
        F: IntoIterator<Item = (String, String)>,
        P: IntoIterator<Item = (String, String)>,
    {
        let mut values = HashMap::new();
        for (key, value) in file_pairs {
            values.entry(key).or_insert(value);
        }
        for (key, value) in process_pairs {
            values.insert(key, value);
        }
        Self {
            values,
            file_loaded: false,
        }
    }

    /// Build directly from pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            file_loaded: false,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether the env file existed and was read
    pub fn file_loaded(&self) -> bool {
        self.file_loaded
    }
}

impl fmt::Debug for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are secrets; only show the shape
        f.debug_struct("EnvSource")
            .field("keys", &self.values.len())
            .field("file_loaded", &self.file_loaded)
            .finish()
    }
}

/// Parse `key=value` lines.
///
/// Blank lines and `#` comments are skipped, the value is everything after the
/// first `=`, and one layer of matching quotes around the value is removed.
/// Lines without `=` or with an empty key are skipped with a warning.
pub fn parse_env_file(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!("Ignoring malformed env line {} (no '=')", index + 1);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            warn!("Ignoring env line {} with empty key", index + 1);
            continue;
        }

        pairs.push((key.to_string(), unquote(value.trim()).to_string()));
    }

    pairs
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
