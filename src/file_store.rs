//! On-disk layout for uploaded item photos.
//!
//! Each item owns at most one directory under the configured upload root,
//! keyed by its immutable surrogate id. The directory is created lazily on
//! first upload and removed again when its last picture is deleted. Paths
//! persisted to the database are relative to the root and always use
//! forward slashes.
//!
//! All filesystem work runs on the blocking thread pool so handlers never
//! stall a runtime worker on disk I/O.

use crate::errors::ServiceError;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

fn join_error(e: task::JoinError) -> ServiceError {
    ServiceError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the upload root if it does not exist yet. Called once at
    /// startup, before the server accepts requests.
    pub fn ensure_root(&self) -> Result<(), ServiceError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn item_dir(&self, item_id: i32) -> PathBuf {
        self.root.join(item_id.to_string())
    }

    /// Resolves a stored relative path to its absolute location.
    pub fn resolve(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }

    /// Writes one uploaded file under the item's directory, creating the
    /// directory on demand. Returns the root-relative path to persist.
    pub async fn save(
        &self,
        item_id: i32,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ServiceError> {
        let store = self.clone();
        let filename = filename.to_string();
        task::spawn_blocking(move || store.save_blocking(item_id, &filename, &bytes))
            .await
            .map_err(join_error)?
    }

    fn save_blocking(
        &self,
        item_id: i32,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, ServiceError> {
        let name = sanitize_filename(filename);
        let dir = self.item_dir(item_id);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&name), bytes)?;
        Ok(format!("{}/{}", item_id, name))
    }

    /// Best-effort rollback of a just-written file when the matching
    /// database insert failed.
    pub async fn discard(&self, rel_path: &str) {
        let store = self.clone();
        let rel_path = rel_path.to_string();
        let joined = task::spawn_blocking(move || {
            let path = store.resolve(&rel_path);
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to discard orphaned upload {}: {}", rel_path, e);
            }
            store.prune_parent_blocking(&rel_path);
        })
        .await;
        if let Err(e) = joined {
            warn!("Discard task failed: {}", e);
        }
    }

    /// Removes the backing file of a picture. A missing file is reported as
    /// a distinct condition so the caller can abort before touching the
    /// database row.
    pub async fn remove_file(&self, rel_path: &str) -> Result<(), ServiceError> {
        let store = self.clone();
        let rel_path = rel_path.to_string();
        task::spawn_blocking(move || {
            let path = store.resolve(&rel_path);
            if !path.is_file() {
                return Err(ServiceError::FileMissing(rel_path));
            }
            fs::remove_file(&path)?;
            Ok(())
        })
        .await
        .map_err(join_error)?
    }

    /// Removes the directory containing `rel_path` when it is now empty.
    /// Failure here never fails the surrounding operation.
    pub async fn prune_parent(&self, rel_path: &str) {
        let store = self.clone();
        let rel_path = rel_path.to_string();
        let joined = task::spawn_blocking(move || store.prune_parent_blocking(&rel_path)).await;
        if let Err(e) = joined {
            warn!("Prune task failed: {}", e);
        }
    }

    fn prune_parent_blocking(&self, rel_path: &str) {
        let path = self.resolve(rel_path);
        let Some(parent) = path.parent() else {
            return;
        };
        // Never prune the upload root itself, only item directories under it.
        if parent == self.root {
            return;
        }
        let is_empty = fs::read_dir(parent)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            if let Err(e) = fs::remove_dir(parent) {
                warn!("Failed to remove empty directory {:?}: {}", parent, e);
            }
        }
    }

    /// Removes an item's whole photo directory after the item was deleted.
    /// A missing directory is fine; any other failure surfaces as a cleanup
    /// error since the database delete has already committed.
    pub async fn remove_item_dir(&self, item_id: i32) -> Result<(), ServiceError> {
        let store = self.clone();
        task::spawn_blocking(move || {
            let dir = store.item_dir(item_id);
            if !dir.is_dir() {
                return Ok(());
            }
            fs::remove_dir_all(&dir)
                .map_err(|e| ServiceError::CleanupFailed(format!("removing {:?}: {}", dir, e)))
        })
        .await
        .map_err(join_error)?
    }
}

/// Reduces an arbitrary client-supplied filename to a safe single path
/// component: final component only, ASCII alphanumerics plus `.`, `-` and
/// `_`, no leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
