use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::config::{LocalConfig, SCHEME};
use crate::storage::content_type::extension;
use crate::storage::{DangerousDriver, FileReader, StorageDriver, StorageError, StorageResult};
use crate::utils::{relative_segments, strip_mount_prefix};

/// Filesystem-backed driver rooted at [`LocalConfig::root`] / 本地文件系统驱动
///
/// New files are created with an exclusive create, so of several concurrent
/// `add_file` calls on one path exactly one succeeds and the rest get
/// `AlreadyExists`. Removing a missing file is `NotFound`.
pub struct LocalDriver {
    config: LocalConfig,
    closed: AtomicBool,
}

impl LocalDriver {
    /// Wrap an already validated configuration whose root exists.
    pub fn new(config: LocalConfig) -> Self {
        Self {
            config,
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    /// Get root directory / 获取根目录
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::NotOpen);
        }
        Ok(())
    }

    /// Resolve a caller path to (key, file on disk); rejects paths leaving the root.
    /// Paths already carrying the mount prefix are accepted as well / 规范化路径
    fn resolve(&self, path: &str) -> StorageResult<(String, PathBuf)> {
        let relative = strip_mount_prefix(&self.config.prefix, path);
        let segments = relative_segments(relative)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;

        let key = segments.join("/");
        let full_path = segments.iter().fold(self.config.root.clone(), |acc, s| acc.join(s));
        Ok((key, full_path))
    }

    fn map_io(key: &str, err: std::io::Error) -> StorageError {
        match err.kind() {
            IoErrorKind::NotFound => StorageError::NotFound(key.to_string()),
            _ => StorageError::Io(err),
        }
    }
}

#[async_trait]
impl StorageDriver for LocalDriver {
    fn name(&self) -> &str {
        SCHEME
    }

    fn accepts(&self, ext: &str) -> bool {
        self.config.accept.contains(ext)
    }

    fn path(&self) -> String {
        self.config.prefix.clone()
    }

    async fn add_file(&self, mut reader: FileReader, path: &str) -> StorageResult<String> {
        self.ensure_open()?;

        let ext = extension(path);
        if !self.accepts(ext) {
            return Err(StorageError::InvalidExtension {
                ext: ext.to_string(),
                path: path.to_string(),
            });
        }

        let (key, full_path) = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(self.normalize_path(&[key.as_str()])));
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            let n = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            Ok::<u64, std::io::Error>(n)
        }
        .await;

        match written {
            Ok(bytes) => {
                tracing::debug!(%key, bytes, "fs: file added");
                Ok(self.normalize_path(&[key.as_str()]))
            }
            Err(e) => {
                drop(file);
                if let Err(cleanup) = tokio::fs::remove_file(&full_path).await {
                    tracing::warn!(%key, error = %cleanup, "fs: failed to remove partial file");
                }
                Err(e.into())
            }
        }
    }

    async fn get_file(&self, path: &str) -> StorageResult<FileReader> {
        self.ensure_open()?;
        let (key, full_path) = self.resolve(path)?;

        let metadata = tokio::fs::metadata(&full_path)
            .await
            .map_err(|e| Self::map_io(&key, e))?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(key));
        }

        let file = tokio::fs::File::open(&full_path)
            .await
            .map_err(|e| Self::map_io(&key, e))?;
        tracing::debug!(%key, size = metadata.len(), "fs: file opened");
        Ok(Box::new(file))
    }

    async fn remove_file(&self, path: &str) -> StorageResult<()> {
        self.ensure_open()?;
        let (key, full_path) = self.resolve(path)?;

        tokio::fs::remove_file(&full_path)
            .await
            .map_err(|e| Self::map_io(&key, e))?;
        tracing::debug!(%key, "fs: file removed");
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(root = %self.config.root.display(), "fs: driver closed");
        }
        Ok(())
    }

    fn as_dangerous(&self) -> Option<&dyn DangerousDriver> {
        Some(self)
    }
}

#[async_trait]
impl DangerousDriver for LocalDriver {
    async fn empty_container(&self) -> StorageResult<()> {
        self.ensure_open()?;
        let root = self.config.root.clone();

        tokio::task::spawn_blocking(move || remove_dir_contents_sync(&root))
            .await
            .map_err(|e| StorageError::backend(SCHEME, e))??;

        tracing::info!(root = %self.config.root.display(), "fs: container emptied");
        Ok(())
    }

    async fn delete_container(&self) -> StorageResult<()> {
        self.empty_container().await?;
        tokio::fs::remove_dir(&self.config.root).await?;

        tracing::info!(root = %self.config.root.display(), "fs: container deleted");
        Ok(())
    }
}

/// Remove everything inside `dir`, keeping `dir` itself (sync, for spawn_blocking)
fn remove_dir_contents_sync(dir: &Path) -> StorageResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}
