// Driver package / 驱动包
pub mod do_space;
pub mod local;
pub mod s3;

use std::sync::Arc;

use crate::storage::DriverRegistry;

/// Register all drivers / 注册所有驱动
pub fn register_all(registry: &DriverRegistry) {
    // 本地文件系统
    registry.register_factory(Arc::new(local::LocalDriverFactory));
    // AWS S3
    registry.register_factory(Arc::new(s3::AwsS3DriverFactory));
    // DigitalOcean Spaces
    registry.register_factory(Arc::new(do_space::DoSpaceDriverFactory));
}
