use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::{StorageError, StorageResult};
use super::query::parse_url;
use super::StorageDriver;

pub type DriverBox = Box<dyn StorageDriver>;

/// Driver factory trait / 驱动工厂 trait
///
/// The registered factory is the prototype for a scheme: it is only used to
/// produce new, independent drivers and is never handed out itself.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Default URL scheme, used by [`DriverRegistry::register_factory`] / 驱动类型名称
    fn scheme(&self) -> &'static str;

    /// Parse `url`, connect, create the container if allowed, and return the driver.
    async fn open(&self, url: &str) -> StorageResult<DriverBox>;
}

/// Maps URL schemes to driver factories / 驱动注册表
///
/// Registration is expected at startup, before the first `open`. Lookups
/// share a read lock; registration takes the write lock for the whole map.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: Arc<RwLock<HashMap<String, Arc<dyn DriverFactory>>>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every bundled driver registered (`fs`, `awss3`, `do`).
    pub fn with_default_drivers() -> Self {
        let registry = Self::new();
        crate::drivers::register_all(&registry);
        registry
    }

    /// Register `factory` under `scheme` / 注册驱动工厂
    ///
    /// # Panics
    ///
    /// Registering a scheme twice is a programming error and panics.
    pub fn register(&self, scheme: &str, factory: Arc<dyn DriverFactory>) {
        let mut factories = self.factories.write();
        if factories.contains_key(scheme) {
            panic!("storage: register called twice for driver {}", scheme);
        }
        factories.insert(scheme.to_string(), factory);

        tracing::info!(scheme, "Driver factory registered");
    }

    /// Register `factory` under its own scheme.
    pub fn register_factory(&self, factory: Arc<dyn DriverFactory>) {
        let scheme = factory.scheme();
        self.register(scheme, factory);
    }

    /// Open a driver for `url` through the factory registered for its scheme.
    /// 根据连接URL打开驱动
    pub async fn open(&self, url: &str) -> StorageResult<DriverBox> {
        let parsed = parse_url(url)?;
        let scheme = parsed.scheme();

        // Clone the factory out so the lock is not held across the connect.
        let factory = self
            .factories
            .read()
            .get(scheme)
            .cloned()
            .ok_or_else(|| StorageError::UnknownDriver(scheme.to_string()))?;

        match factory.open(url).await {
            Ok(driver) => {
                tracing::info!(scheme, path = %driver.path(), "Driver opened");
                Ok(driver)
            }
            Err(e) => {
                tracing::error!(scheme, error = %e, "Driver open failed");
                Err(e)
            }
        }
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.factories.read().contains_key(scheme)
    }

    /// List all registered schemes, sorted / 列出所有可用的驱动类型
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.factories.read().keys().cloned().collect();
        schemes.sort();
        schemes
    }
}
