use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

use super::format::{is_supported_mime, ClipFormat};
use super::name::ClipName;
use crate::error::ClipError;

/// A clip that exists on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// Clip name (file stem)
    pub name: ClipName,
    /// Full path of the backing file
    pub path: PathBuf,
    /// Format judged from the extension
    pub format: ClipFormat,
    /// File size in bytes
    pub size: u64,
}

/// Audio ready to be sent back to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipMedia {
    /// Clip name, used as the attachment filename stem
    pub name: String,
    /// Outbound MIME type
    pub mime: &'static str,
    /// Raw file contents
    pub data: Vec<u8>,
}

/// Outcome of a successful save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedClip {
    /// The clip as now stored
    pub clip: Clip,
    /// Files of the same name under other extensions that were replaced
    pub replaced: Vec<ClipFormat>,
}

/// Aggregate numbers for the clip directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageInfo {
    /// Number of distinct clip names
    pub clip_count: usize,
    /// Bytes used by supported clip files
    pub total_bytes: u64,
}

/// Name-addressed clip storage backed by a single directory.
///
/// Files are named `<name><ext>`; format and existence are discovered from
/// the directory itself, there is no index.
#[derive(Debug, Clone)]
pub struct ClipRegistry {
    dir: PathBuf,
    max_file_size: usize,
}

impl ClipRegistry {
    /// Create a registry over `dir`, creating the directory if needed.
    ///
    /// Failure to create the directory is logged, not returned: the bot
    /// keeps running and saves report a storage error later.
    pub async fn open(dir: impl Into<PathBuf>, max_file_size: usize) -> Self {
        let dir = dir.into();

        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            _ => match fs::create_dir_all(&dir).await {
                Ok(()) => info!(dir = %dir.display(), "created voices directory"),
                Err(e) => error!(
                    dir = %dir.display(),
                    error = %e,
                    "failed to create voices directory"
                ),
            },
        }

        Self { dir, max_file_size }
    }

    /// Storage directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &ClipName, format: ClipFormat) -> PathBuf {
        self.dir
            .join(format!("{}{}", name.as_str(), format.extension()))
    }

    /// Store `data` under `name`, replacing any previous clip of that name.
    ///
    /// # Errors
    /// Returns a validation error for a bad name, MIME type or payload size,
    /// or [`ClipError::Storage`] if the write fails
    pub async fn save(
        &self,
        name: &str,
        data: &[u8],
        mime: Option<&str>,
    ) -> Result<SavedClip, ClipError> {
        let name = ClipName::parse(name)?;
        let mime = mime.filter(|m| !m.trim().is_empty());

        if let Some(mime) = mime {
            if !is_supported_mime(mime) {
                return Err(ClipError::UnsupportedFormat {
                    mime: mime.to_owned(),
                });
            }
        }
        if data.is_empty() {
            return Err(ClipError::EmptyPayload);
        }
        if data.len() > self.max_file_size {
            return Err(ClipError::PayloadTooLarge {
                size: data.len(),
                max: self.max_file_size,
            });
        }

        let format = ClipFormat::from_mime(mime);
        let path = self.path_for(&name, format);

        // Write beside the target then swap in, so a failed write never
        // truncates the clip already stored under this name
        let partial = self.dir.join(format!(".{}{}.part", name.as_str(), format.extension()));
        if let Err(e) = fs::write(&partial, data).await {
            let _ = fs::remove_file(&partial).await;
            return Err(ClipError::storage("write clip", &partial, e));
        }
        if let Err(e) = fs::rename(&partial, &path).await {
            let _ = fs::remove_file(&partial).await;
            return Err(ClipError::storage("store clip", &path, e));
        }

        // Keep one file per name: drop siblings left by an earlier save
        let mut replaced = Vec::new();
        for other in ClipFormat::ALL.into_iter().filter(|f| *f != format) {
            let stale = self.path_for(&name, other);
            match fs::remove_file(&stale).await {
                Ok(()) => {
                    debug!(path = %stale.display(), "removed stale clip format");
                    replaced.push(other);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    path = %stale.display(),
                    error = %e,
                    "failed to remove stale clip format"
                ),
            }
        }

        info!(
            clip = %name,
            format = %format,
            bytes = data.len(),
            "clip saved"
        );

        Ok(SavedClip {
            clip: Clip {
                name,
                path,
                format,
                size: data.len() as u64,
            },
            replaced,
        })
    }

    /// Look up a clip, probing extensions in [`ClipFormat::ALL`] order.
    ///
    /// # Errors
    /// Returns [`ClipError::InvalidName`] or [`ClipError::NotFound`]
    pub async fn get(&self, name: &str) -> Result<Clip, ClipError> {
        let name = ClipName::parse(name)?;

        for format in ClipFormat::ALL {
            let path = self.path_for(&name, format);
            match fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {
                    return Ok(Clip {
                        name,
                        path,
                        format,
                        size: meta.len(),
                    });
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(ClipError::storage("inspect clip", &path, e)),
            }
        }

        Err(ClipError::NotFound {
            name: name.as_str().to_owned(),
        })
    }

    /// Read a clip's bytes for playback
    ///
    /// # Errors
    /// Returns [`ClipError::Storage`] if the file can't be read
    pub async fn load(&self, clip: &Clip) -> Result<ClipMedia, ClipError> {
        let data = fs::read(&clip.path)
            .await
            .map_err(|e| ClipError::storage("read clip", &clip.path, e))?;

        Ok(ClipMedia {
            name: clip.name.as_str().to_owned(),
            mime: clip.format.mime_type(),
            data,
        })
    }

    /// Sorted, de-duplicated names of all stored clips
    ///
    /// # Errors
    /// Returns [`ClipError::Storage`] if the directory can't be read
    pub async fn list(&self) -> Result<Vec<String>, ClipError> {
        let names: BTreeSet<String> = self
            .scan()
            .await?
            .into_iter()
            .map(|(name, _, _)| name)
            .collect();

        Ok(names.into_iter().collect())
    }

    /// Remove a clip under every extension.
    ///
    /// Returns `true` if at least one file was removed.
    ///
    /// # Errors
    /// Returns [`ClipError::InvalidName`], or [`ClipError::Storage`] if an
    /// existing file could not be removed
    pub async fn delete(&self, name: &str) -> Result<bool, ClipError> {
        let name = ClipName::parse(name)?;
        let mut deleted = false;
        let mut failure = None;

        for format in ClipFormat::ALL {
            let path = self.path_for(&name, format);
            match fs::remove_file(&path).await {
                Ok(()) => {
                    deleted = true;
                    info!(path = %path.display(), "deleted clip file");
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to delete clip file");
                    failure.get_or_insert(ClipError::storage("delete clip", path, e));
                }
            }
        }

        match failure {
            Some(err) if !deleted => Err(err),
            _ => Ok(deleted),
        }
    }

    /// Clip count and bytes used
    ///
    /// # Errors
    /// Returns [`ClipError::Storage`] if the directory can't be read
    pub async fn storage_info(&self) -> Result<StorageInfo, ClipError> {
        let files = self.scan().await?;
        let names: BTreeSet<&str> = files.iter().map(|(name, _, _)| name.as_str()).collect();

        Ok(StorageInfo {
            clip_count: names.len(),
            total_bytes: files.iter().map(|(_, _, size)| size).sum(),
        })
    }

    /// All supported clip files as `(name, path, size)`
    pub(crate) async fn scan(&self) -> Result<Vec<(String, PathBuf, u64)>, ClipError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| ClipError::storage("list clips in", &self.dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ClipError::storage("list clips in", &self.dir, e))?
        {
            let path = entry.path();
            let Some(name) = path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(addressable_stem)
            else {
                continue;
            };
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            files.push((name.as_str().to_owned(), path, meta.len()));
        }

        Ok(files)
    }
}

/// Clip name of a file that `get` and `delete` can reach: exactly
/// `<name><ext>` with a lowercase extension from [`ClipFormat::ALL`] and a
/// stem that is already a valid, trimmed clip name
fn addressable_stem(file_name: &str) -> Option<ClipName> {
    let stem = ClipFormat::ALL
        .into_iter()
        .find_map(|format| file_name.strip_suffix(format.extension()))?;
    ClipName::parse(stem)
        .ok()
        .filter(|name| name.as_str() == stem)
}

/// Human-readable byte size, base 1024 (`"0 Bytes"`, `"1.5 KB"`)
#[must_use]
#[allow(clippy::cast_precision_loss)] // Display only
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
