use std::fmt;

use thiserror::Error;

use crate::shared::constants::STORAGE_SCHEME;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    #[error("expected a gs:// URI")]
    WrongScheme,
    #[error("missing bucket name")]
    MissingBucket,
}

/// A `gs://bucket/key` reference to a bucket and an optional object inside it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageLocator {
    pub bucket: String,
    pub key: Option<String>,
}

impl StorageLocator {
    pub fn new(bucket: impl Into<String>, key: Option<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key,
        }
    }

    /// Parse `gs://bucket[/key...]`.
    ///
    /// Everything after the first `/` following the bucket is the key, so
    /// nested object names like `a/b/c.mp3` are kept whole. Trailing slashes
    /// are dropped, and an empty key is treated as omitted.
    pub fn parse(uri: &str) -> Result<Self, LocatorError> {
        let rest = uri
            .strip_prefix(STORAGE_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or(LocatorError::WrongScheme)?;

        let (bucket, key) = match rest.split_once('/') {
            Some((bucket, key)) => (bucket, key),
            None => (rest, ""),
        };

        if bucket.is_empty() {
            return Err(LocatorError::MissingBucket);
        }

        let key = key.trim_end_matches('/');
        let key = (!key.is_empty()).then(|| key.to_string());
        Ok(Self::new(bucket, key))
    }

    /// Final path component of the key, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.key
            .as_deref()
            .and_then(|k| k.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }

    /// Extension of the key's file name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self::new(self.bucket.clone(), Some(key.into()))
    }
}

impl fmt::Display for StorageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{STORAGE_SCHEME}://{}/{key}", self.bucket),
            None => write!(f, "{STORAGE_SCHEME}://{}", self.bucket),
        }
    }
}
