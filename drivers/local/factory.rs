use async_trait::async_trait;

use super::config::{LocalConfig, SCHEME};
use super::driver::LocalDriver;
use crate::storage::{DriverBox, DriverFactory, StorageError, StorageResult};

pub struct LocalDriverFactory;

impl LocalDriverFactory {
    /// Open a typed driver, for callers that want [`LocalDriver`] itself.
    pub async fn open_local(&self, url: &str) -> StorageResult<LocalDriver> {
        let mut config = LocalConfig::from_url(url)?;

        match tokio::fs::metadata(&config.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StorageError::backend(
                    SCHEME,
                    format!("{} is not a directory", config.root.display()),
                ));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !config.auto_create {
                    return Err(StorageError::ContainerMissing {
                        backend: SCHEME.to_string(),
                        container: config.root.display().to_string(),
                    });
                }
                tokio::fs::create_dir_all(&config.root).await?;
                tracing::info!(root = %config.root.display(), "fs: root directory created");
            }
            Err(e) => return Err(e.into()),
        }

        config.root = tokio::fs::canonicalize(&config.root).await?;
        tracing::info!(root = %config.root.display(), prefix = %config.prefix, "Local driver initialized");

        Ok(LocalDriver::new(config))
    }
}

#[async_trait]
impl DriverFactory for LocalDriverFactory {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    async fn open(&self, url: &str) -> StorageResult<DriverBox> {
        Ok(Box::new(self.open_local(url).await?))
    }
}
