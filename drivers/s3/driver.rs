//! S3-compatible driver core / S3驱动核心实现
//!
//! Shared by every backend speaking the S3 API (`awss3`, `do`):
//! - keys are `<prefix>/<path>` inside one bucket
//! - new objects get the configured canned ACL and an inferred content type
//! - existence is probed with HEAD right before the upload (check-then-act)
//! - uploads stream from the reader; rust-s3 switches to multipart above 8 MiB

use async_trait::async_trait;
use parking_lot::RwLock;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{BucketConfiguration, Region};

use crate::storage::content_type::{extension, resolve_content_type};
use crate::storage::{
    AcceptSet, DangerousDriver, FileReader, StorageDriver, StorageError, StorageResult,
};
use crate::utils::relative_segments;

/// Everything needed to connect to one bucket / 连接参数
#[derive(Clone)]
pub struct S3Target {
    /// Scheme reported in errors and logs (`awss3`, `do`)
    pub backend: &'static str,
    pub bucket: String,
    /// Key prefix, starting with `/`
    pub prefix: String,
    pub region: Region,
    pub credentials: Credentials,
    pub path_style: bool,
    pub auto_create: bool,
    /// Canned ACL sent as `x-amz-acl` on upload
    pub acl: String,
    pub accept: AcceptSet,
    /// Public base URL, prefix included
    pub public_base: String,
}

/// Build S3 credentials from explicit keys / 创建S3凭证
pub fn static_credentials(backend: &str, key: &str, secret: &str) -> StorageResult<Credentials> {
    Credentials::new(Some(key), Some(secret), None, None, None)
        .map_err(|e| StorageError::backend(backend, format!("failed to create credentials: {}", e)))
}

/// Credentials from the environment / shared profile chain.
pub fn default_credentials(backend: &str) -> StorageResult<Credentials> {
    Credentials::default()
        .map_err(|e| StorageError::backend(backend, format!("failed to load credentials: {}", e)))
}

/// S3驱动
///
/// `add_file` is not atomic against concurrent writers of the same key: a
/// racing writer may get `AlreadyExists`, or both uploads may succeed and the
/// last one wins. Removing a missing key succeeds, as S3 itself reports it.
pub struct S3Driver {
    backend: &'static str,
    bucket_name: String,
    prefix: String,
    acl: String,
    accept: AcceptSet,
    public_base: String,
    /// None once closed / 关闭后为None
    bucket: RwLock<Option<Box<Bucket>>>,
}

impl S3Driver {
    /// Connect, creating the bucket when missing and auto-create is on.
    pub async fn connect(target: S3Target) -> StorageResult<Self> {
        let bucket = Self::create_bucket(&target)?;

        let exists = bucket
            .exists()
            .await
            .map_err(|e| StorageError::backend(target.backend, e))?;

        if !exists {
            if !target.auto_create {
                return Err(StorageError::ContainerMissing {
                    backend: target.backend.to_string(),
                    container: target.bucket.clone(),
                });
            }
            Self::create_remote_bucket(&target).await?;
        }

        tracing::info!(
            backend = target.backend,
            bucket = %target.bucket,
            prefix = %target.prefix,
            "S3 driver initialized"
        );
        Ok(Self::with_bucket(target, bucket))
    }

    /// Wrap an existing bucket handle without contacting the service.
    pub fn with_bucket(target: S3Target, bucket: Box<Bucket>) -> Self {
        Self {
            backend: target.backend,
            bucket_name: target.bucket,
            prefix: target.prefix,
            acl: target.acl,
            accept: target.accept,
            public_base: target.public_base,
            bucket: RwLock::new(Some(bucket)),
        }
    }

    /// 创建S3 Bucket客户端
    pub fn create_bucket(target: &S3Target) -> StorageResult<Box<Bucket>> {
        let bucket = Bucket::new(&target.bucket, target.region.clone(), target.credentials.clone())
            .map_err(|e| StorageError::backend(target.backend, format!("failed to create bucket client: {}", e)))?;

        let bucket = if target.path_style {
            bucket.with_path_style()
        } else {
            bucket
        };
        Ok(bucket)
    }

    async fn create_remote_bucket(target: &S3Target) -> StorageResult<()> {
        let config = BucketConfiguration::default();
        let response = if target.path_style {
            Bucket::create_with_path_style(
                &target.bucket,
                target.region.clone(),
                target.credentials.clone(),
                config,
            )
            .await
        } else {
            Bucket::create(&target.bucket, target.region.clone(), target.credentials.clone(), config).await
        }
        .map_err(|e| StorageError::backend(target.backend, e))?;

        if !response.success() {
            return Err(StorageError::backend(
                target.backend,
                format!(
                    "creating bucket {} failed with status {}: {}",
                    target.bucket, response.response_code, response.response_text
                ),
            ));
        }

        tracing::info!(backend = target.backend, bucket = %target.bucket, region = %target.region, "Bucket created");
        Ok(())
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    fn bucket(&self) -> StorageResult<Box<Bucket>> {
        self.bucket.read().clone().ok_or(StorageError::NotOpen)
    }

    /// Caller path -> (path relative to the prefix, full object key) / 获取完整的对象键
    fn object_key(&self, path: &str) -> StorageResult<(String, String)> {
        let segments = relative_segments(path)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StorageError::InvalidPath(path.to_string()))?;
        let relative = segments.join("/");

        let root = self.prefix.trim_matches('/');
        let key = if root.is_empty() {
            relative.clone()
        } else {
            format!("{}/{}", root, relative)
        };
        Ok((relative, key))
    }

    /// HEAD the key; 404 means free / 检查对象是否存在
    async fn object_exists(&self, bucket: &Bucket, key: &str) -> StorageResult<bool> {
        match bucket.head_object(key).await {
            Ok((_, code)) => head_status(self.backend, key, code),
            Err(e) => match failed_with(&e) {
                Some(code) => head_status(self.backend, key, code),
                None => Err(StorageError::backend(self.backend, e)),
            },
        }
    }
}

fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

fn status_error(backend: &str, action: &str, key: &str, code: u16) -> StorageError {
    StorageError::backend(backend, format!("{} {} failed with status {}", action, key, code))
}

/// HEAD: 2xx means the key is taken, 404 means it is free.
fn head_status(backend: &str, key: &str, code: u16) -> StorageResult<bool> {
    match code {
        404 => Ok(false),
        code if is_success(code) => Ok(true),
        code => Err(status_error(backend, "HEAD", key, code)),
    }
}

fn put_status(backend: &str, key: &str, code: u16) -> StorageResult<()> {
    if is_success(code) {
        Ok(())
    } else {
        Err(status_error(backend, "PUT", key, code))
    }
}

fn get_status(backend: &str, key: &str, code: u16) -> StorageResult<()> {
    match code {
        404 => Err(StorageError::NotFound(key.to_string())),
        code if is_success(code) => Ok(()),
        code => Err(status_error(backend, "GET", key, code)),
    }
}

/// DELETE: a missing key counts as deleted.
fn delete_status(backend: &str, key: &str, code: u16) -> StorageResult<()> {
    if is_success(code) || code == 404 {
        Ok(())
    } else {
        Err(status_error(backend, "DELETE", key, code))
    }
}

/// HTTP status carried by a client error, when the `fail-on-err` path produced one.
fn failed_with(err: &S3Error) -> Option<u16> {
    match err {
        S3Error::HttpFailWithBody(code, _) => Some(*code),
        _ => None,
    }
}

#[async_trait]
impl StorageDriver for S3Driver {
    fn name(&self) -> &str {
        self.backend
    }

    fn accepts(&self, ext: &str) -> bool {
        self.accept.contains(ext)
    }

    fn path(&self) -> String {
        self.public_base.clone()
    }

    async fn add_file(&self, mut reader: FileReader, path: &str) -> StorageResult<String> {
        let bucket = self.bucket()?;

        let ext = extension(path);
        if !self.accepts(ext) {
            return Err(StorageError::InvalidExtension {
                ext: ext.to_string(),
                path: path.to_string(),
            });
        }

        let (relative, key) = self.object_key(path)?;

        if self.object_exists(&bucket, &key).await? {
            return Err(StorageError::AlreadyExists(key));
        }

        let content_type = resolve_content_type(path);
        let mut upload = bucket;
        upload.add_header("x-amz-acl", &self.acl);

        // 流式上传，大文件自动分片
        let response = upload
            .put_object_stream_with_content_type(&mut reader, &key, content_type)
            .await
            .map_err(|e| StorageError::backend(self.backend, e))?;
        put_status(self.backend, &key, response.status_code())?;

        tracing::debug!(
            backend = self.backend,
            %key,
            bytes = response.uploaded_bytes(),
            content_type,
            "S3 object uploaded"
        );
        Ok(self.normalize_path(&[relative.as_str()]))
    }

    async fn get_file(&self, path: &str) -> StorageResult<FileReader> {
        let bucket = self.bucket()?;
        let (_, key) = self.object_key(path)?;

        let response = match bucket.get_object(&key).await {
            Ok(response) => response,
            Err(e) => {
                if let Some(code) = failed_with(&e) {
                    get_status(self.backend, &key, code)?;
                }
                return Err(StorageError::backend(self.backend, e));
            }
        };
        get_status(self.backend, &key, response.status_code())?;

        // rust-s3返回完整响应，封装为AsyncRead
        let data = response.bytes().clone();
        tracing::debug!(backend = self.backend, %key, bytes = data.len(), "S3 object fetched");
        Ok(Box::new(std::io::Cursor::new(data)))
    }

    async fn remove_file(&self, path: &str) -> StorageResult<()> {
        let bucket = self.bucket()?;
        let (_, key) = self.object_key(path)?;

        let response = bucket
            .delete_object(&key)
            .await
            .map_err(|e| StorageError::backend(self.backend, e))?;
        delete_status(self.backend, &key, response.status_code())?;

        tracing::debug!(backend = self.backend, %key, "S3 object deleted");
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        if self.bucket.write().take().is_some() {
            tracing::debug!(backend = self.backend, bucket = %self.bucket_name, "S3 driver closed");
        }
        Ok(())
    }

    fn as_dangerous(&self) -> Option<&dyn DangerousDriver> {
        Some(self)
    }
}

#[async_trait]
impl DangerousDriver for S3Driver {
    /// Delete every object in the bucket, not only under the prefix / 清空存储桶
    async fn empty_container(&self) -> StorageResult<()> {
        let bucket = self.bucket()?;

        let results = bucket
            .list(String::new(), None)
            .await
            .map_err(|e| StorageError::backend(self.backend, e))?;

        let mut deleted = 0usize;
        for result in results {
            for obj in result.contents {
                let response = bucket
                    .delete_object(&obj.key)
                    .await
                    .map_err(|e| StorageError::backend(self.backend, e))?;
                delete_status(self.backend, &obj.key, response.status_code())?;
                deleted += 1;
            }
        }

        tracing::info!(backend = self.backend, bucket = %self.bucket_name, deleted, "Bucket emptied");
        Ok(())
    }

    async fn delete_container(&self) -> StorageResult<()> {
        self.empty_container().await?;

        let bucket = self.bucket()?;
        let code = bucket
            .delete()
            .await
            .map_err(|e| StorageError::backend(self.backend, e))?;
        if !is_success(code) {
            return Err(status_error(self.backend, "DELETE bucket", &self.bucket_name, code));
        }

        tracing::info!(backend = self.backend, bucket = %self.bucket_name, "Bucket deleted");
        Ok(())
    }
}
