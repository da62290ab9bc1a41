use async_trait::async_trait;
use tokio::io::AsyncRead;

pub mod conformance;
pub mod content_type;
pub mod error;
pub mod query;
pub mod registry;

pub use content_type::resolve_content_type;
pub use error::{ErrorKind, StorageError, StorageResult};
pub use query::AcceptSet;
pub use registry::{DriverBox, DriverFactory, DriverRegistry};

/// Sequential reader handed to and returned from drivers / 文件内容读取器
pub type FileReader = Box<dyn AsyncRead + Unpin + Send>;

/// Storage driver interface / 存储驱动接口
///
/// A driver is produced by its [`DriverFactory`] from a connection URL and is
/// open from that moment until [`close`](StorageDriver::close). Every file
/// operation on a closed driver fails with [`StorageError::NotOpen`].
///
/// Concurrent operations on different paths are safe. Concurrent `add_file`
/// calls on the *same* path are only guaranteed to produce a single winner when
/// the backend documents an exclusive create; see each driver.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// URL scheme this driver was opened with / 驱动名称
    fn name(&self) -> &str;

    /// Whether files with extension `ext` may be stored / 是否允许该扩展名
    fn accepts(&self, ext: &str) -> bool;

    /// Externally reachable base (public URL prefix or mount path) / 外部访问基础路径
    fn path(&self) -> String;

    /// `path()` joined with `entries` / 拼接外部访问路径
    /// e.g. `normalize_path(&["path/to/file"]) == "/assets/path/to/file"`
    fn normalize_path(&self, entries: &[&str]) -> String {
        crate::utils::join_base(&self.path(), entries)
    }

    /// Store the contents of `reader` at `path` and return its external path.
    ///
    /// Fails with `InvalidExtension` when the extension is not accepted and with
    /// `AlreadyExists` when something is stored there already; nothing is written
    /// in either case.
    async fn add_file(&self, reader: FileReader, path: &str) -> StorageResult<String>;

    /// Open the file at `path` for reading; missing files are `NotFound`.
    async fn get_file(&self, path: &str) -> StorageResult<FileReader>;

    /// Remove the file at `path` / 删除文件
    async fn remove_file(&self, path: &str) -> StorageResult<()>;

    /// Release the connection handle. Idempotent, never touches stored data.
    async fn close(&self) -> StorageResult<()>;

    /// Irreversible container operations, for drivers that support them.
    /// Callers must ask for them explicitly / 危险操作需显式获取
    fn as_dangerous(&self) -> Option<&dyn DangerousDriver> {
        None
    }
}

/// Container-wide operations that permanently destroy data / 危险操作接口
#[async_trait]
pub trait DangerousDriver: Send + Sync {
    /// Remove every object in the container (bucket, space, root directory).
    async fn empty_container(&self) -> StorageResult<()>;

    /// Empty the container, then delete it. If emptying fails the container
    /// is left in place and the error is returned.
    async fn delete_container(&self) -> StorageResult<()>;
}
