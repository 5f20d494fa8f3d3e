//! System-wide configuration for Plinth
//!
//! System config is stored at `~/.config/plinth/config.toml` (Linux/macOS)
//! or `%APPDATA%\plinth\config.toml` (Windows).
//!
//! It holds the filesystem roots commands operate against; each root can be
//! overridden per invocation with a global flag.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// System-wide Plinth configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Filesystem roots
    pub roots: RootsConfig,
}

/// Filesystem roots configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RootsConfig {
    /// Staging area holding objects' working trees
    pub workspace: PathBuf,

    /// Public stacks tree shelved files are served from
    pub stacks: PathBuf,

    /// Preservation export area holding bags and their tars
    pub export: PathBuf,

    /// Technical-metadata documents
    pub metadata: PathBuf,
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("/var/plinth/workspace"),
            stacks: PathBuf::from("/var/plinth/stacks"),
            export: PathBuf::from("/var/plinth/export"),
            metadata: PathBuf::from("/var/plinth/techmd"),
        }
    }
}

/// Get the system config directory path
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir().map(|h| h.join(".config/plinth"))
    }

    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|c| c.join("plinth"))
    }

    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map(|c| c.join("plinth"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        dirs::home_dir().map(|h| h.join(".config/plinth"))
    }
}

/// Get the system config file path
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load system configuration
///
/// Returns default config if the file doesn't exist.
pub fn load() -> Result<SystemConfig> {
    let config_path = match config_file_path() {
        Some(p) => p,
        None => {
            tracing::debug!("Could not determine config directory, using defaults");
            return Ok(SystemConfig::default());
        }
    };

    if !config_path.exists() {
        tracing::debug!(
            "System config not found at {}, using defaults",
            config_path.display()
        );
        return Ok(SystemConfig::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read system config at {}", config_path.display()))?;

    let config: SystemConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse system config at {}", config_path.display()))?;

    Ok(config)
}

/// Effective roots after per-invocation overrides
#[derive(Debug, Clone)]
pub struct Roots {
    pub workspace: PathBuf,
    pub stacks: PathBuf,
    pub export: PathBuf,
    pub metadata: PathBuf,
}

/// Resolve the filesystem roots: flag overrides win over the system config
pub fn resolve_roots(
    workspace: Option<PathBuf>,
    stacks: Option<PathBuf>,
    export: Option<PathBuf>,
    metadata: Option<PathBuf>,
) -> Result<Roots> {
    let config = load()?;

    Ok(Roots {
        workspace: workspace.unwrap_or(config.roots.workspace),
        stacks: stacks.unwrap_or(config.roots.stacks),
        export: export.unwrap_or(config.roots.export),
        metadata: metadata.unwrap_or(config.roots.metadata),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() -> Result<()> {
        let config = SystemConfig::default();
        let toml_str = toml::to_string_pretty(&config)?;

        let parsed: SystemConfig = toml::from_str(&toml_str)?;
        assert_eq!(parsed.roots.workspace, config.roots.workspace);
        assert_eq!(parsed.roots.metadata, config.roots.metadata);

        Ok(())
    }

    #[test]
    fn test_partial_config_fills_defaults() -> Result<()> {
        let parsed: SystemConfig = toml::from_str(
            r#"
            [roots]
            workspace = "/mnt/staging"
            "#,
        )?;

        assert_eq!(parsed.roots.workspace, PathBuf::from("/mnt/staging"));
        assert_eq!(parsed.roots.stacks, PathBuf::from("/var/plinth/stacks"));

        Ok(())
    }
}
