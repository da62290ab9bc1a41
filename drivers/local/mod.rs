//! Local filesystem driver (`fs://`) / 本地存储驱动

pub mod config;
pub mod driver;
pub mod factory;

pub use config::LocalConfig;
pub use driver::LocalDriver;
pub use factory::LocalDriverFactory;
