//! DigitalOcean Spaces configuration / DO Spaces 配置

use serde::{Deserialize, Serialize};
use s3::Region;

use crate::drivers::s3::config::decode;
use crate::drivers::s3::driver::{static_credentials, S3Target};
use crate::storage::query::{normalize_prefix, parse_url, QueryParams, DEFAULT_ACCEPT};
use crate::storage::{AcceptSet, StorageError, StorageResult};

pub const SCHEME: &str = "do";
pub const URL_SHAPE: &str = "do://key:secret@space/prefix";

/// Datacenters offering Spaces
pub const REGIONS: &[&str] = &[
    "ams1", "ams2", "ams3", "lon1", "nyc1", "nyc2", "nyc3", "sfo1", "sgp1",
];

pub const ACLS: &[&str] = &["private", "public-read"];

/// Parsed `do://` connection URL.
///
/// The access key and secret travel in the userinfo part and are never
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceConfig {
    pub space: String,
    pub prefix: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_acl")]
    pub acl: String,
    #[serde(default = "default_auto_create")]
    pub auto_create: bool,
    #[serde(default = "AcceptSet::defaults")]
    pub accept: AcceptSet,
    #[serde(skip)]
    pub key: String,
    #[serde(skip)]
    pub secret: String,
}

fn default_region() -> String {
    "nyc3".to_string()
}

fn default_acl() -> String {
    "public-read".to_string()
}

fn default_auto_create() -> bool {
    true
}

impl SpaceConfig {
    pub fn from_url(url: &str) -> StorageResult<Self> {
        let parsed = parse_url(url)?;

        let key = decode(parsed.username())?;
        let secret = decode(parsed.password().unwrap_or(""))?;
        let space = parsed.host_str().unwrap_or("").to_string();
        let prefix = parsed.path().trim_matches('/').to_string();

        // 一次性报告所有缺失部分
        let missing: Vec<&'static str> = [
            ("key", key.is_empty()),
            ("secret", secret.is_empty()),
            ("space", space.is_empty()),
            ("prefix", prefix.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(StorageError::MissingSegments {
                scheme: SCHEME.to_string(),
                url: url.to_string(),
                shape: URL_SHAPE,
                missing,
            });
        }

        let query = QueryParams::from_url(&parsed);
        Ok(Self {
            space,
            prefix: normalize_prefix(&prefix),
            region: query.closed_set(SCHEME, "region", REGIONS)?.unwrap_or_else(default_region),
            acl: query.closed_set(SCHEME, "acl", ACLS)?.unwrap_or_else(default_acl),
            auto_create: query.auto_create(SCHEME)?,
            accept: query.accept_set(DEFAULT_ACCEPT),
            key,
            secret,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("https://{}.digitaloceanspaces.com", self.region)
    }

    pub fn public_base(&self) -> String {
        format!("https://{}.{}.digitaloceanspaces.com{}", self.space, self.region, self.prefix)
    }

    pub fn target(&self) -> StorageResult<S3Target> {
        Ok(S3Target {
            backend: SCHEME,
            bucket: self.space.clone(),
            prefix: self.prefix.clone(),
            region: Region::Custom {
                region: self.region.clone(),
                endpoint: self.endpoint(),
            },
            credentials: static_credentials(SCHEME, &self.key, &self.secret)?,
            path_style: false,
            auto_create: self.auto_create,
            acl: self.acl.clone(),
            accept: self.accept.clone(),
            public_base: self.public_base(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = SpaceConfig::from_url("do://key:secret@myspace/assets").unwrap();
        assert_eq!(config.key, "key");
        assert_eq!(config.secret, "secret");
        assert_eq!(config.space, "myspace");
        assert_eq!(config.prefix, "/assets");
        assert_eq!(config.region, "nyc3");
        assert_eq!(config.acl, "public-read");
        assert!(config.auto_create);
        assert_eq!(config.accept, AcceptSet::defaults());
        assert_eq!(config.endpoint(), "https://nyc3.digitaloceanspaces.com");
        assert_eq!(config.public_base(), "https://myspace.nyc3.digitaloceanspaces.com/assets");
    }

    #[test]
    fn test_parse_overrides() {
        let config = SpaceConfig::from_url(
            "do://AK%2B1:s%2Fecret@myspace/img/a?region=AMS3&acl=private&auto-create=none&accept=.gif",
        )
        .unwrap();
        assert_eq!(config.key, "AK+1");
        assert_eq!(config.secret, "s/ecret");
        assert_eq!(config.region, "ams3");
        assert_eq!(config.acl, "private");
        assert!(!config.auto_create);
        assert_eq!(config.accept, AcceptSet::new([".gif"]));
        assert_eq!(config.public_base(), "https://myspace.ams3.digitaloceanspaces.com/img/a");
    }

    #[test]
    fn test_missing_segments_reported_together() {
        let err = SpaceConfig::from_url("do://myspace").unwrap_err();
        match err {
            StorageError::MissingSegments { missing, shape, .. } => {
                assert_eq!(missing, vec!["key", "secret", "prefix"]);
                assert_eq!(shape, URL_SHAPE);
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = SpaceConfig::from_url("do://key@myspace/p").unwrap_err();
        assert!(matches!(err, StorageError::MissingSegments { ref missing, .. } if missing == &vec!["secret"]));
    }

    #[test]
    fn test_closed_sets() {
        let err = SpaceConfig::from_url("do://k:s@sp/p?region=fra1").unwrap_err();
        assert_eq!(err.to_string(), "do: unknown region value: fra1");

        let err = SpaceConfig::from_url("do://k:s@sp/p?acl=public-read-write").unwrap_err();
        assert_eq!(err.to_string(), "do: unknown acl value: public-read-write");

        // auto-create values are not regions
        let err = SpaceConfig::from_url("do://k:s@sp/p?region=off").unwrap_err();
        assert!(matches!(err, StorageError::InvalidParameter { param: "region", .. }));
    }

    #[test]
    fn test_target() {
        let config = SpaceConfig::from_url("do://k:s@sp/p?region=sgp1").unwrap();
        let target = config.target().unwrap();
        assert_eq!(target.backend, SCHEME);
        assert_eq!(target.bucket, "sp");
        assert_eq!(target.public_base, "https://sp.sgp1.digitaloceanspaces.com/p");
        assert!(matches!(
            target.region,
            Region::Custom { ref endpoint, .. } if endpoint == "https://sgp1.digitaloceanspaces.com"
        ));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = SpaceConfig::from_url("do://topkey:topsecret@sp/p").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("topkey"));
        assert!(!json.contains("topsecret"));

        let back: SpaceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.space, "sp");
        assert!(back.key.is_empty());
    }
}
