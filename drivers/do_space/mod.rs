//! DigitalOcean Spaces (`do://`), served by the S3 driver

pub mod config;
pub mod factory;

pub use config::SpaceConfig;
pub use factory::DoSpaceDriverFactory;
