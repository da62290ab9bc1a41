//! Connection URL helpers shared by every driver's configuration parser.
//!
//! A connection URL looks like `scheme://[credentials@]container/prefix[?query]`.
//! Drivers pull their container and prefix out of the authority and path, and
//! read optional overrides from the query through [`QueryParams`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{StorageError, StorageResult};

/// Extensions accepted when a URL carries no `accept` parameter / 默认允许的扩展名
pub const DEFAULT_ACCEPT: &[&str] = &[".jpeg", ".jpg", ".png", ".svg"];

/// `auto-create` values that turn container creation off / 关闭自动创建的取值
pub const AUTO_CREATE_OFF: &[&str] = &["0", "false", "nil", "disable", "none", "off"];

/// Set of lowercase, dot-prefixed extensions a driver will store / 允许的扩展名集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptSet(BTreeSet<String>);

impl AcceptSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(entries.into_iter().filter_map(|e| normalize_ext(e.as_ref())).collect())
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_ACCEPT.iter().copied())
    }

    /// Merge every occurrence of a repeated, comma-separated query value.
    /// `None` (parameter absent) falls back to `defaults`.
    pub fn from_values<'a, I>(values: Option<I>, defaults: &[&str]) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        match values {
            None => Self::new(defaults.iter().copied()),
            Some(values) => Self::new(values.into_iter().flat_map(|v| v.split(','))),
        }
    }

    pub fn contains(&self, ext: &str) -> bool {
        normalize_ext(ext).is_some_and(|e| self.0.contains(&e))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// `PNG` -> `.png`, ` .Txt ` -> `.txt`; empty entries are dropped.
fn normalize_ext(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    let ext = ext.to_lowercase();
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{}", ext))
    }
}

/// Decoded query parameters of a connection URL, keeping every occurrence.
#[derive(Debug, Default)]
pub struct QueryParams {
    values: HashMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn from_url(url: &Url) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url.query_pairs() {
            values.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        Self { values }
    }

    /// First non-empty occurrence of `key`; empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn get_all(&self, key: &str) -> Option<impl Iterator<Item = &str>> {
        self.values.get(key).map(|v| v.iter().map(String::as_str))
    }

    pub fn accept_set(&self, defaults: &[&str]) -> AcceptSet {
        AcceptSet::from_values(self.get_all("accept"), defaults)
    }

    /// Lowercased value of `key`, which must belong to `allowed` when present.
    pub fn closed_set(
        &self,
        scheme: &str,
        key: &'static str,
        allowed: &[&str],
    ) -> StorageResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => {
                let value = value.to_lowercase();
                if allowed.contains(&value.as_str()) {
                    Ok(Some(value))
                } else {
                    Err(StorageError::invalid_parameter(scheme, key, value))
                }
            }
        }
    }

    /// Container auto-creation: on unless `auto-create` is one of [`AUTO_CREATE_OFF`].
    pub fn auto_create(&self, scheme: &str) -> StorageResult<bool> {
        Ok(self.closed_set(scheme, "auto-create", AUTO_CREATE_OFF)?.is_none())
    }

    /// Boolean toggle such as `path-style=true`.
    pub fn flag(&self, scheme: &str, key: &'static str) -> StorageResult<Option<bool>> {
        match self.get(key).map(str::to_lowercase).as_deref() {
            None => Ok(None),
            Some("1" | "true" | "on" | "yes" | "enable") => Ok(Some(true)),
            Some(v) if AUTO_CREATE_OFF.contains(&v) => Ok(Some(false)),
            Some(v) => Err(StorageError::invalid_parameter(scheme, key, v)),
        }
    }
}

/// Parse a connection URL, mapping syntax errors to [`StorageError::InvalidUrl`].
pub fn parse_url(url: &str) -> StorageResult<Url> {
    let parsed = Url::parse(url).map_err(|e| StorageError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.scheme().is_empty() {
        return Err(StorageError::InvalidUrl {
            url: url.to_string(),
            reason: "invalid URL scheme".to_string(),
        });
    }
    Ok(parsed)
}

/// Prefix with a guaranteed leading separator and no trailing one / 确保前缀以 / 开头
pub fn normalize_prefix(prefix: &str) -> String {
    crate::utils::fix_and_clean_path(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(url: &str) -> QueryParams {
        QueryParams::from_url(&Url::parse(url).unwrap())
    }

    fn set(items: &[&str]) -> AcceptSet {
        AcceptSet::new(items.iter().copied())
    }

    #[test]
    fn test_accept_merges_repeated_and_comma_separated() {
        let q = params("awss3://b/p?accept=.a,.b&accept=.c");
        assert_eq!(q.accept_set(DEFAULT_ACCEPT), set(&[".a", ".b", ".c"]));

        let q = params("awss3://b/p?accept=.a,.b,&accept=.b");
        assert_eq!(q.accept_set(DEFAULT_ACCEPT), set(&[".a", ".b"]));
    }

    #[test]
    fn test_accept_defaults_when_absent() {
        let q = params("awss3://b/p?region=eu-west-1");
        let got = q.accept_set(DEFAULT_ACCEPT);
        assert_eq!(got, AcceptSet::defaults());
        assert_eq!(got.len(), 4);
    }

    #[test]
    fn test_accept_empty_value_contributes_nothing() {
        let q = params("awss3://b/p?accept=");
        assert!(q.accept_set(DEFAULT_ACCEPT).is_empty());

        let q = params("awss3://b/p?accept=&accept=.txt");
        assert_eq!(q.accept_set(DEFAULT_ACCEPT), set(&[".txt"]));
    }

    #[test]
    fn test_accept_set_normalizes() {
        let accept = set(&["PNG", " .Txt ", "."]);
        assert_eq!(accept.iter().collect::<Vec<_>>(), vec![".png", ".txt"]);
        assert!(accept.contains(".PNG"));
        assert!(accept.contains("txt"));
        assert!(!accept.contains(""));
        assert!(!accept.contains(".jpg"));
    }

    #[test]
    fn test_closed_set() {
        let q = params("awss3://b/p?acl=Private&region=");
        assert_eq!(
            q.closed_set("awss3", "acl", &["private", "public-read"]).unwrap(),
            Some("private".to_string())
        );
        assert_eq!(q.closed_set("awss3", "region", &["nyc3"]).unwrap(), None);

        let q = params("awss3://b/p?acl=everyone");
        let err = q.closed_set("awss3", "acl", &["private"]).unwrap_err();
        assert_eq!(err.to_string(), "awss3: unknown acl value: everyone");
    }

    #[test]
    fn test_auto_create() {
        assert!(params("fs://x/").auto_create("fs").unwrap());
        assert!(params("fs://x/?auto-create=").auto_create("fs").unwrap());
        for off in AUTO_CREATE_OFF {
            let q = params(&format!("fs://x/?auto-create={}", off.to_uppercase()));
            assert!(!q.auto_create("fs").unwrap());
        }
        let err = params("fs://x/?auto-create=yes").auto_create("fs").unwrap_err();
        assert!(matches!(err, StorageError::InvalidParameter { param: "auto-create", .. }));
    }

    #[test]
    fn test_flag() {
        assert_eq!(params("s://b/p?path-style=true").flag("s", "path-style").unwrap(), Some(true));
        assert_eq!(params("s://b/p?path-style=off").flag("s", "path-style").unwrap(), Some(false));
        assert_eq!(params("s://b/p").flag("s", "path-style").unwrap(), None);
        assert!(params("s://b/p?path-style=maybe").flag("s", "path-style").is_err());
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("fs://irrelevant/?accept=.txt").is_ok());
        let err = parse_url("no-scheme/path").unwrap_err();
        assert!(matches!(err, StorageError::InvalidUrl { .. }));
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("assets"), "/assets");
        assert_eq!(normalize_prefix("/assets/"), "/assets");
        assert_eq!(normalize_prefix(""), "/");
    }
}
