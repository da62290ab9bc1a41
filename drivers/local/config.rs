//! Local filesystem driver configuration / 本地驱动配置

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::query::{normalize_prefix, parse_url, QueryParams, DEFAULT_ACCEPT};
use crate::storage::{AcceptSet, StorageResult};

pub const SCHEME: &str = "fs";

/// Parsed `fs://` connection URL.
///
/// `fs://irrelevant/assets?root=/srv/files&accept=.txt,.png` stores files under
/// `/srv/files` and reports them as `/assets/<path>`. The host is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Directory on disk holding the files / 根目录
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Mount path reported to callers, always starting with `/` / 挂载路径
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Create `root` on open when missing / 自动创建根目录
    #[serde(default = "default_auto_create")]
    pub auto_create: bool,
    #[serde(default = "AcceptSet::defaults")]
    pub accept: AcceptSet,
}

fn default_root() -> PathBuf {
    std::env::temp_dir().join("assets")
}

fn default_prefix() -> String {
    "/".to_string()
}

fn default_auto_create() -> bool {
    true
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            prefix: default_prefix(),
            auto_create: default_auto_create(),
            accept: AcceptSet::defaults(),
        }
    }
}

impl LocalConfig {
    pub fn from_url(url: &str) -> StorageResult<Self> {
        // The scheme already picked this driver; any registered alias is fine.
        let parsed = parse_url(url)?;

        let query = QueryParams::from_url(&parsed);
        let root = query.get("root").map(PathBuf::from).unwrap_or_else(default_root);

        Ok(Self {
            root,
            prefix: normalize_prefix(parsed.path()),
            auto_create: query.auto_create(SCHEME)?,
            accept: query.accept_set(DEFAULT_ACCEPT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_parse_full_url() {
        let config = LocalConfig::from_url("fs://irrelevant/assets?accept=.txt&root=/srv/files").unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/files"));
        assert_eq!(config.prefix, "/assets");
        assert!(config.auto_create);
        assert_eq!(config.accept, AcceptSet::new([".txt"]));
    }

    #[test]
    fn test_defaults() {
        let config = LocalConfig::from_url("fs://irrelevant/").unwrap();
        assert_eq!(config, LocalConfig::default());
    }

    #[test]
    fn test_auto_create_off_and_invalid() {
        let config = LocalConfig::from_url("fs://x/?auto-create=off").unwrap();
        assert!(!config.auto_create);

        let err = LocalConfig::from_url("fs://x/?auto-create=sometimes").unwrap_err();
        assert_eq!(err.to_string(), "fs: unknown auto-create value: sometimes");
    }

    #[test]
    fn test_scheme_is_not_checked() {
        let config = LocalConfig::from_url("file://x/media?root=/data").unwrap();
        assert_eq!(config.prefix, "/media");
        assert_eq!(config.root, PathBuf::from("/data"));

        let err = LocalConfig::from_url("not a url").unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl { .. }));
    }

    #[test]
    fn test_serializes_for_logging() {
        let config = LocalConfig::from_url("fs://x/media?root=/data&accept=.png").unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["prefix"], "/media");
        assert_eq!(json["accept"], serde_json::json!([".png"]));
    }
}
