//! Shared filesystem helpers: crash-safe writes and path normalization

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Atomic write helper
///
/// Writes data to a temporary file, fsyncs it, then renames it to the target
/// path. This ensures crash safety.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    use std::fs;
    use std::io::Write;

    // Ensure tmp_dir exists
    fs::create_dir_all(tmp_dir)?;

    // Generate unique temp file path
    let temp_path = tmp_dir.join(format!("{}", uuid::Uuid::new_v4()));

    // Write data to temp file
    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?; // fsync file
    drop(temp_file);

    // Ensure target parent directory exists
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    // Rename to target (atomic on POSIX systems)
    fs::rename(&temp_path, target)?;

    // Fsync parent directory for durability
    if let Some(parent) = target.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Normalize a relative file path from an externally supplied diff or record
///
/// - Converts to relative path with `/` separator
/// - Rejects `..` and absolute paths
/// - Removes `./` prefix
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    // Reject absolute paths
    if path.is_absolute() {
        anyhow::bail!("Absolute paths not allowed: {}", path.display());
    }

    // Check each component for .. (reject path traversal)
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                anyhow::bail!("Path traversal not allowed: {}", path.display());
            }
            std::path::Component::RootDir => {
                anyhow::bail!("Absolute paths not allowed: {}", path.display());
            }
            _ => {}
        }
    }

    // Convert to string and normalize
    let path_str = path.to_string_lossy();

    // Remove ./ prefix if present
    let normalized = if let Some(stripped) = path_str.strip_prefix("./") {
        stripped
    } else {
        path_str.as_ref()
    };

    // Convert backslashes to forward slashes (Windows compatibility)
    let normalized = normalized.replace('\\', "/");

    Ok(PathBuf::from(normalized))
}
