//! Filesystem-level picture storage.
//!
//! Files live under `{base_dir}/{owner_id}/{category}/` and are named after
//! a content hash plus a random nonce, so two uploads of the same bytes never
//! share a file. Paths handed out and accepted by the store are relative to
//! `base_dir`.

use std::path::{Component, Path, PathBuf};

use gallery_core::{BloggerId, Error, PictureCategory, Result};
use gallery_db::models::Picture;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Blob store holding the files behind picture records.
pub trait FileStore: Send + Sync {
    /// Persist an uploaded blob and return its store path.
    fn save(&self, data: &[u8], owner_id: BloggerId, category: PictureCategory) -> Result<String>;

    /// Best-effort removal. `false` covers both a missing file and an I/O
    /// error; the caller decides how serious that is.
    fn delete(&self, path: &str) -> bool;

    /// Move a picture's file to where `category` keeps it.
    ///
    /// Returns the new path, or the picture's current path unchanged when
    /// the file already lives in the right place.
    fn relocate(&self, picture: &Picture, category: PictureCategory) -> Result<String>;

    fn exists(&self, path: &str) -> bool;
}

/// [`FileStore`] on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    base_dir: PathBuf,
}

impl LocalFileStore {
    /// Create a new `LocalFileStore` rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute location of a store path, or `None` when the path would
    /// escape the base directory.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || !confined {
            return None;
        }
        Some(self.base_dir.join(relative))
    }

    fn category_dir(&self, owner_id: BloggerId, category: PictureCategory) -> PathBuf {
        self.base_dir
            .join(owner_id.to_string())
            .join(category.as_str())
    }
}

impl FileStore for LocalFileStore {
    fn save(&self, data: &[u8], owner_id: BloggerId, category: PictureCategory) -> Result<String> {
        let format = image::guess_format(data)
            .map_err(|_| Error::Validation("upload is not a recognized image format".into()))?;
        let extension = format.extensions_str().first().copied().unwrap_or("img");

        let file_name = format!("{}-{}.{}", compute_hash(data), nonce(), extension);

        let dir = self.category_dir(owner_id, category);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join(&file_name), data)?;

        let path = store_path(owner_id, category, &file_name);
        tracing::debug!("Saved {} bytes to {path}", data.len());
        Ok(path)
    }

    fn delete(&self, path: &str) -> bool {
        let Some(full) = self.resolve(path) else {
            tracing::warn!("Refusing to delete path outside the store: {path}");
            return false;
        };
        match std::fs::remove_file(&full) {
            Ok(()) => {
                tracing::debug!("Deleted {}", full.display());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to delete {}: {e}", full.display());
                false
            }
        }
    }

    fn relocate(&self, picture: &Picture, category: PictureCategory) -> Result<String> {
        let file_name = Path::new(&picture.path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::io(format!("picture path has no file name: {}", picture.path)))?;

        let target = store_path(picture.owner_id, category, file_name);
        if target == picture.path {
            return Ok(target);
        }

        let source = self
            .resolve(&picture.path)
            .ok_or_else(|| Error::io(format!("path outside the store: {}", picture.path)))?;

        let dir = self.category_dir(picture.owner_id, category);
        std::fs::create_dir_all(&dir)?;
        std::fs::rename(&source, dir.join(file_name))?;

        tracing::debug!("Moved {} to {target}", picture.path);
        Ok(target)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }
}

/// Default title for a picture stored at `path`: its file stem.
pub fn title_from_path(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn store_path(owner_id: BloggerId, category: PictureCategory, file_name: &str) -> String {
    format!("{owner_id}/{category}/{file_name}")
}

/// Compute the content hash for picture data.
///
/// Returns the first 16 hex characters of the SHA-256 digest.
fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    hex::encode(&digest[..8]) // 8 bytes = 16 hex chars
}

fn nonce() -> String {
    let mut s = Uuid::new_v4().simple().to_string();
    s.truncate(8);
    s
}
