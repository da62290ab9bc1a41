//! S3-compatible storage (`awss3://`) / S3存储驱动

pub mod config;
pub mod driver;
pub mod factory;

pub use config::S3Config;
pub use driver::{S3Driver, S3Target};
pub use factory::AwsS3DriverFactory;
