use async_trait::async_trait;

use super::config::{S3Config, SCHEME};
use super::driver::S3Driver;
use crate::storage::{DriverBox, DriverFactory, StorageResult};

/// Opens `awss3://` URLs / S3驱动工厂
pub struct AwsS3DriverFactory;

#[async_trait]
impl DriverFactory for AwsS3DriverFactory {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    async fn open(&self, url: &str) -> StorageResult<DriverBox> {
        let config = S3Config::from_url(url)?;
        let driver = S3Driver::connect(config.target()?).await?;
        Ok(Box::new(driver))
    }
}
