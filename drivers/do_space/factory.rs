use async_trait::async_trait;

use super::config::{SpaceConfig, SCHEME};
use crate::drivers::s3::S3Driver;
use crate::storage::{DriverBox, DriverFactory, StorageResult};

/// Opens `do://` URLs on the shared S3 driver / DO Spaces驱动工厂
pub struct DoSpaceDriverFactory;

#[async_trait]
impl DriverFactory for DoSpaceDriverFactory {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    async fn open(&self, url: &str) -> StorageResult<DriverBox> {
        let config = SpaceConfig::from_url(url)?;
        let driver = S3Driver::connect(config.target()?).await?;
        Ok(Box::new(driver))
    }
}
