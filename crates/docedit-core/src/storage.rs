//! Blob storage for document versions
//!
//! Every version of a document is a separate immutable file. Writes go to a
//! temporary file in the target directory and are moved into place without
//! replacing anything already there, so a reader never sees a partial file
//! and an existing version is never overwritten.

use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;

/// Storage for immutable document blobs, addressed by relative path
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under a sanitized form of `name` and return its path.
    /// Fails with [`StorageError::AlreadyExists`] instead of overwriting.
    fn save(&self, name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove a blob; removing one that does not exist succeeds
    fn delete(&self, path: &str) -> Result<(), StorageError>;

    fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Public URL of a blob
    fn url_for(&self, path: &str) -> String;
}

/// Blob store on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            base_url: base_url.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> Result<(String, PathBuf), StorageError> {
        let relative = sanitize_path(path);
        if relative.is_empty() {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        let full = self.root.join(&relative);
        Ok((relative, full))
    }
}

impl BlobStore for LocalBlobStore {
    fn save(&self, name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let file_name = sanitize_file_name(name);
        if file_name.is_empty() {
            return Err(StorageError::InvalidPath(name.to_string()));
        }
        let target = self.root.join(&file_name);

        let mut temp = NamedTempFile::new_in(&self.root)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == IoErrorKind::AlreadyExists {
                StorageError::AlreadyExists(file_name.clone())
            } else {
                StorageError::Io(e.error)
            }
        })?;

        debug!(path = %target.display(), size = bytes.len(), "Saved file");
        Ok(file_name)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let (relative, full) = self.full_path(path)?;
        fs::read(&full).map_err(|e| match e.kind() {
            IoErrorKind::NotFound => StorageError::NotFound(relative),
            _ => StorageError::Io(e),
        })
    }

    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let (_, full) = self.full_path(path)?;
        match fs::remove_file(&full) {
            Ok(()) => {
                debug!(path = %full.display(), "Deleted file");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let (_, full) = self.full_path(path)?;
        match fs::metadata(&full) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            sanitize_path(path)
        )
    }
}

/// Strip traversal and separators from a file name
pub fn sanitize_file_name(name: &str) -> String {
    name.replace("..", "")
        .replace(['/', '\\'], "_")
        .trim()
        .to_string()
}

/// Normalize a relative path: no root, no `.` or `..` components
pub fn sanitize_path(path: &str) -> String {
    Path::new(&path.replace('\\', "/"))
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
