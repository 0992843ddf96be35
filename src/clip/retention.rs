use std::time::{Duration, SystemTime};
use tokio::fs;

use super::registry::ClipRegistry;
use crate::error::ClipError;

/// Delete stored clips whose files were last modified more than `max_age` ago.
///
/// Returns the number of files deleted.
///
/// # Errors
/// Returns error if directory listing fails. Individual file deletion
/// failures are logged but don't stop cleanup.
pub async fn prune_older_than(
    registry: &ClipRegistry,
    max_age: Duration,
) -> Result<usize, ClipError> {
    prune_older_than_at(registry, max_age, SystemTime::now()).await
}

async fn prune_older_than_at(
    registry: &ClipRegistry,
    max_age: Duration,
    now: SystemTime,
) -> Result<usize, ClipError> {
    if !fs::try_exists(registry.dir()).await.unwrap_or(false) {
        tracing::debug!("voices directory does not exist, skipping cleanup");
        return Ok(0);
    }

    let clips = registry.scan().await?;
    if clips.is_empty() {
        tracing::debug!("no clips found, skipping cleanup");
        return Ok(0);
    }

    let mut deleted_count = 0;
    for (name, path, _) in &clips {
        let modified = match fs::metadata(path).await.and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!("failed to read mtime of {}: {}", path.display(), e);
                continue;
            }
        };

        // Files stamped in the future count as fresh
        let age = now.duration_since(modified).unwrap_or_default();
        if age <= max_age {
            continue;
        }

        match fs::remove_file(path).await {
            Ok(()) => {
                deleted_count += 1;
                tracing::info!(clip = %name, "pruned expired clip: {}", path.display());
            }
            Err(e) => {
                tracing::warn!("failed to delete {}: {}", path.display(), e);
            }
        }
    }

    if deleted_count > 0 {
        tracing::info!(
            "cleanup complete: deleted {} clips (total: {}, remaining: {})",
            deleted_count,
            clips.len(),
            clips.len() - deleted_count
        );
    }

    Ok(deleted_count)
}
