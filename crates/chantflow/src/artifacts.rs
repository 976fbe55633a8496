//! Writing CSV artifacts and logging their checksums.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use contours::{Checksum, TableError};
use tracing::info;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write an artifact through `write` and log where it went and its checksum.
///
/// Content goes to a sibling `.tmp` file that is renamed over `path` once
/// complete, so `path` never holds a partial table.
pub fn write_artifact<F>(path: &Path, what: &str, write: F) -> Result<Checksum>
where
    F: FnOnce(&Path) -> Result<(), TableError>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to write {what}"));
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {} into place", path.display()))?;

    let checksum = Checksum::of_file(path)
        .with_context(|| format!("Failed to hash {}", path.display()))?;
    info!("Stored {} to {}", what, path.display());
    info!("checksum: {}", checksum);
    Ok(checksum)
}
