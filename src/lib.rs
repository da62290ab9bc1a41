//! Pluggable file storage behind connection URLs.
//!
//! ```no_run
//! # async fn demo() -> blobdrive::StorageResult<()> {
//! let registry = blobdrive::DriverRegistry::with_default_drivers();
//! let driver = registry.open("fs:///assets?root=/srv/assets&accept=.txt").await?;
//! let content = Box::new(std::io::Cursor::new(b"hello".to_vec()));
//! let location = driver.add_file(content, "docs/hello.txt").await?;
//! assert_eq!(location, "/assets/docs/hello.txt");
//! driver.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod storage;
pub mod utils;

// Driver modules (point to project root drivers via path attribute) / 驱动模块
#[path = "../drivers/mod.rs"]
pub mod drivers;

pub use storage::{
    DangerousDriver, DriverFactory, DriverRegistry, FileReader, StorageDriver, StorageError,
    StorageResult,
};

/// Route `tracing` output to the test harness, honouring `RUST_LOG`.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Only the first call installs the subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blobdrive=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
