//! Object storage access.
//!
//! Objects are addressed by endpoint, bucket and key. The default endpoint
//! is the public Google Cloud Storage download host. Any HTTP(S) endpoint
//! serving `{endpoint}/{bucket}/{key}` works, and a `file://` endpoint maps
//! buckets to directories on disk.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

const FILE_SCHEME: &str = "file://";
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Address of a single object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub endpoint: Option<String>,
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(endpoint: Option<String>, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .map(|e| e.trim_end_matches('/'))
            .unwrap_or(DEFAULT_ENDPOINT)
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.endpoint(), self.bucket, self.key)
    }
}

/// Read access to an object store.
pub trait ObjectStore: Send + Sync {
    /// Fetch the object's bytes, or [`Error::NotFound`] if it does not exist.
    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>>;
}

/// Serves `file://` endpoints from disk and everything else over HTTP.
pub struct DefaultObjectStore {
    http: HttpObjectStore,
    fs: FsObjectStore,
}

impl DefaultObjectStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpObjectStore::new()?,
            fs: FsObjectStore,
        })
    }
}

impl ObjectStore for DefaultObjectStore {
    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        if location.endpoint().starts_with(FILE_SCHEME) {
            self.fs.get(location)
        } else {
            self.http.get(location)
        }
    }
}

/// Plain HTTP GET against `{endpoint}/{bucket}/{key}`.
pub struct HttpObjectStore {
    client: reqwest::blocking::Client,
}

impl HttpObjectStore {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| Error::Http {
                location: "client".to_string(),
                source,
            })?;
        Ok(Self { client })
    }
}

impl ObjectStore for HttpObjectStore {
    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        let url = location.to_string();
        debug!(%url, "fetching object");

        let http_err = |source| Error::Http {
            location: url.clone(),
            source,
        };

        let response = self.client.get(&url).send().map_err(http_err)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::not_found(&url)),
            status if !status.is_success() => Err(Error::Status {
                location: url,
                status: status.as_u16(),
            }),
            _ => Ok(response.bytes().map_err(http_err)?.to_vec()),
        }
    }
}

/// Resolves `file://<dir>` endpoints to `<dir>/<bucket>/<key>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsObjectStore;

impl FsObjectStore {
    fn resolve(location: &ObjectLocation) -> Result<PathBuf> {
        let root = location
            .endpoint()
            .strip_prefix(FILE_SCHEME)
            .ok_or_else(|| Error::InvalidLocation {
                location: location.to_string(),
                reason: "expected a file:// endpoint".to_string(),
            })?;

        plugin_fs::validate_path_identifier(&location.bucket)?;
        Ok(PathBuf::from(root)
            .join(&location.bucket)
            .join(plugin_fs::relative_path(&location.key)?))
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        let path = Self::resolve(location)?;
        debug!(path = %path.display(), "reading object from disk");
        plugin_fs::io::read_optional(&path)?.ok_or_else(|| Error::not_found(location.to_string()))
    }
}

/// In-memory object store, keyed by bucket and key.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    requests: Mutex<Vec<ObjectLocation>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((bucket.to_string(), key.to_string()), bytes.into());
    }

    /// Every location requested so far, in order.
    pub fn requests(&self) -> Vec<ObjectLocation> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(location.clone());
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(location.bucket.clone(), location.key.clone()))
            .cloned()
            .ok_or_else(|| Error::not_found(location.to_string()))
    }
}
