//! File system helpers shared by the output modules.
//!
//! - Atomic whole-file replacement for generated documents and index files
//! - Output directory validation before any rendering work is done

use crate::error::{ReleaseNotesError, Result};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Replace `path` with `bytes` atomically.
///
/// The content is written to a hidden temporary file next to `path`, synced,
/// and renamed over the target, so an interrupted run leaves either the old
/// or the new file, never a truncated one. Parent directories are created.
#[instrument(level = "debug", skip(bytes), fields(path = %path.display(), len = bytes.len()))]
pub async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .await
        .map_err(|e| ReleaseNotesError::io(parent, e))?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let tmp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));

    let mut file = fs::File::create(&tmp)
        .await
        .map_err(|e| ReleaseNotesError::io(&tmp, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| ReleaseNotesError::io(&tmp, e))?;
    file.sync_all()
        .await
        .map_err(|e| ReleaseNotesError::io(&tmp, e))?;
    drop(file);

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ReleaseNotesError::io(path, e));
    }
    debug!("Replaced file atomically");
    Ok(())
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| ReleaseNotesError::io(path, e))?;
    let probe_path = path.join("..__probe_write__");
    fs::write(&probe_path, b"")
        .await
        .map_err(|e| ReleaseNotesError::io(&probe_path, e))?;
    let _ = fs::remove_file(&probe_path).await;
    info!("Output directory is writable");
    Ok(())
}
