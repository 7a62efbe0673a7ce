//! Image disposal for deleted or replaced posts.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Refusing to dispose '{0}': path escapes the image root")]
    OutsideRoot(String),

    #[error("Failed to remove '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Removes stored files by reference. Callers treat failures as best-effort.
#[async_trait]
pub trait FileDisposer: Send + Sync {
    async fn dispose(&self, image_ref: &str) -> Result<(), FileError>;
}

/// Deletes files under a root directory.
///
/// References are the stored form `images/<file>`, taken relative to the root
/// (the application directory by default).
#[derive(Debug, Clone)]
pub struct DiskFileDisposer {
    root: PathBuf,
}

impl DiskFileDisposer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a reference to a path under the root, rejecting absolute paths and `..`
    fn resolve(&self, image_ref: &str) -> Result<PathBuf, FileError> {
        let relative = Path::new(image_ref.trim());
        let safe = !relative.as_os_str().is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(FileError::OutsideRoot(image_ref.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileDisposer for DiskFileDisposer {
    async fn dispose(&self, image_ref: &str) -> Result<(), FileError> {
        let path = self.resolve(image_ref)?;
        tokio::fs::remove_file(&path).await.map_err(|source| FileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!("Disposed image {}", path.display());
        Ok(())
    }
}
