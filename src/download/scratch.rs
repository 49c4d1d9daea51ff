//! Per-request scratch directories.
//!
//! Every download gets its own directory under the configured temp root.
//! The request that created it is the only writer, and it removes the
//! directory once the file has been sent or the download has failed.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::core::config;

/// Suffixes yt-dlp uses for unfinished or bookkeeping files
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// A directory owned by exactly one download request.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Creates a fresh `download_<uuid>` directory under `root`.
    pub fn create_in(root: &Path) -> io::Result<Self> {
        fs_err::create_dir_all(root)?;
        let path = root.join(format!("{}{}", config::download::SCRATCH_PREFIX, Uuid::new_v4().simple()));
        fs_err::create_dir(&path)?;
        log::debug!("Created scratch directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when `file` lives somewhere inside this directory.
    pub fn contains(&self, file: &Path) -> bool {
        file.starts_with(&self.path)
    }

    /// Returns the first non-empty regular file, in file-name order.
    pub fn first_media_file(&self) -> io::Result<Option<PathBuf>> {
        first_media_file_in(&self.path)
    }

    /// Removes the directory and everything in it.
    ///
    /// Best-effort: failures are logged and never returned to the caller.
    pub fn cleanup(self) {
        match fs_err::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed scratch directory {}", self.path.display()),
            Err(e) => log::error!("Failed to clean up scratch directory: {}", e),
        }
    }
}

/// Returns the first non-empty regular file in `dir`, in file-name order.
///
/// Partial downloads left behind by yt-dlp are skipped.
pub fn first_media_file_in(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs_err::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }
        match fs_err::metadata(&path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => return Ok(Some(path)),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable scratch entry: {}", e),
        }
    }

    Ok(None)
}
