//! Facade configuration via `typedkv.toml`
//!
//! Settings are read once when a `Connection` is built and are immutable
//! afterwards. A missing field takes its default, so an empty file is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use typedkv_core::{Error, Result, ScanOptions};

/// Config file name looked up by applications embedding typedkv.
pub const CONFIG_FILE_NAME: &str = "typedkv.toml";

/// Default page size hint for cursor scans.
pub const DEFAULT_SCAN_COUNT: usize = 10;

/// Facade configuration loaded from `typedkv.toml`.
///
/// # Example
///
/// ```toml
/// # Page size hint passed to the store on every cursor scan
/// scan_count = 10
///
/// # Permit blocking pops that wait forever (MaxWait::Unbounded)
/// allow_unbounded_blocking = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Page size hint for `SCAN`/`HSCAN`/`SSCAN` cursors.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
    /// Whether `MaxWait::Unbounded` is accepted by blocking pops.
    #[serde(default)]
    pub allow_unbounded_blocking: bool,
}

fn default_scan_count() -> usize {
    DEFAULT_SCAN_COUNT
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            scan_count: default_scan_count(),
            allow_unbounded_blocking: false,
        }
    }
}

impl FacadeConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan page size hint
    pub fn with_scan_count(mut self, scan_count: usize) -> Self {
        self.scan_count = scan_count;
        self
    }

    /// Accept `MaxWait::Unbounded` on blocking pops
    pub fn with_unbounded_blocking(mut self) -> Self {
        self.allow_unbounded_blocking = true;
        self
    }

    /// Check settings that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `scan_count` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.scan_count == 0 {
            return Err(Error::config(
                "scan_count in typedkv.toml must be at least 1",
            ));
        }
        Ok(())
    }

    /// Scan options for a match expression, using the configured page size
    pub fn scan_options(&self, pattern: &str) -> ScanOptions {
        ScanOptions::new().pattern(pattern).count(self.scan_count)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# typedkv facade configuration
#
# Page size hint passed to the store on every cursor scan (default: 10).
# Larger pages mean fewer round trips per scan and more memory per page.
scan_count = 10

# Permit blocking pops that wait forever (default: false).
# When false, MaxWait::Unbounded is rejected with a precondition error and
# every blocking pop must carry a finite bound.
allow_unbounded_blocking = false
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: FacadeConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
