//! Object storage locations (S3, GCS, Azure, local)

use crate::config::StorageCredentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// A root inside an object store, parsed from a URL
///
/// All paths taken and returned by a `Location` are relative to its root,
/// `/`-separated, and free of the store's own percent-encoding.
#[derive(Clone)]
pub struct Location {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Root prefix within the bucket/container
    prefix: ObjectPath,
    /// URL scheme for logging
    scheme: String,
    /// Original URL for logging
    url: String,
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Location")
            .field("url", &self.url)
            .field("scheme", &self.scheme)
            .field("prefix", &self.prefix.as_ref())
            .finish_non_exhaustive()
    }
}

impl Location {
    /// Open an existing input location
    ///
    /// A local path that does not exist fails with `InputNotFound`.
    pub fn open_input(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        Self::open(url, credentials, false)
    }

    /// Open an output location, creating local directories as needed
    pub fn open_output(url: &str, credentials: &StorageCredentials) -> Result<Self> {
        Self::open(url, credentials, true)
    }

    /// Parse a location URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` (also `s3a://` and `s3n://`) - AWS S3
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `file:///local/path/`, `/local/path/` or `./path/` - Local filesystem
    fn open(url: &str, credentials: &StorageCredentials, create: bool) -> Result<Self> {
        if !url.contains("://") {
            return Self::open_local(url, std::path::Path::new(url), create);
        }

        let parsed = Url::parse(url)?;
        match parsed.scheme() {
            "s3" | "s3a" | "s3n" => Self::open_s3(url, &parsed, credentials),
            "gs" => Self::open_gcs(url, &parsed),
            "az" | "abfs" => Self::open_azure(url, &parsed),
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|()| Error::config(format!("Invalid file URL {url}")))?;
                Self::open_local(url, &path, create)
            }
            other => Err(Error::config(format!(
                "Unsupported storage scheme '{other}' in {url}"
            ))),
        }
    }

    /// Wrap an existing object store (used with in-memory stores in tests)
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        Self {
            store,
            prefix: ObjectPath::from(prefix),
            scheme: "memory".to_string(),
            url: format!("memory:///{}", prefix.trim_matches('/')),
        }
    }

    fn bucket_and_prefix(url: &str, parsed: &Url) -> Result<(String, ObjectPath)> {
        let bucket = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::config(format!("Missing bucket name in {url}")))?;
        Ok((bucket.to_string(), ObjectPath::from(parsed.path())))
    }

    fn open_s3(url: &str, parsed: &Url, credentials: &StorageCredentials) -> Result<Self> {
        let (bucket, prefix) = Self::bucket_and_prefix(url, parsed)?;

        // Without an explicit key pair fall back to the default credential chain
        let mut builder = if credentials.has_key_pair() {
            AmazonS3Builder::new()
        } else {
            AmazonS3Builder::from_env()
        };
        builder = builder.with_bucket_name(&bucket);

        if let (Some(key_id), Some(secret)) = (
            &credentials.access_key_id,
            &credentials.secret_access_key,
        ) {
            builder = builder
                .with_access_key_id(key_id)
                .with_secret_access_key(secret);
        }
        if let Some(token) = &credentials.session_token {
            builder = builder.with_token(token);
        }
        if let Some(region) = &credentials.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &credentials.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client for {url}: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "s3".to_string(),
            url: url.to_string(),
        })
    }

    fn open_gcs(url: &str, parsed: &Url) -> Result<Self> {
        let (bucket, prefix) = Self::bucket_and_prefix(url, parsed)?;

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client for {url}: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            url: url.to_string(),
        })
    }

    fn open_azure(url: &str, parsed: &Url) -> Result<Self> {
        let (container, prefix) = Self::bucket_and_prefix(url, parsed)?;

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client for {url}: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            url: url.to_string(),
        })
    }

    fn open_local(url: &str, dir: &std::path::Path, create: bool) -> Result<Self> {
        if create {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::config(format!("Failed to create directory {}: {e}", dir.display()))
            })?;
        } else if !dir.is_dir() {
            return Err(Error::input_not_found(url));
        }

        let store = LocalFileSystem::new_with_prefix(dir).map_err(|e| {
            Error::config(format!(
                "Failed to create local store for {}: {e}",
                dir.display()
            ))
        })?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::default(),
            scheme: "file".to_string(),
            url: url.to_string(),
        })
    }

    /// Get the scheme (s3, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the URL this location was opened from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Human-readable form of a relative path, for logs and errors
    pub fn display_path(&self, relative: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), relative)
    }

    fn qualify(&self, relative: &str) -> ObjectPath {
        let relative = ObjectPath::from(relative);
        self.prefix.parts().chain(relative.parts()).collect()
    }

    fn relativize(&self, path: &ObjectPath) -> String {
        let skip = self.prefix.parts().count();
        path.parts()
            .skip(skip)
            .map(|part| percent_decode(part.as_ref()))
            .collect::<Vec<_>>()
            .join("/")
    }

    /// List every object below `relative_prefix`, sorted by path
    ///
    /// A prefix with nothing under it yields an empty list.
    pub async fn list(&self, relative_prefix: &str) -> Result<Vec<String>> {
        let prefix = self.qualify(relative_prefix);
        let listing = self.store.list(Some(&prefix)).try_collect::<Vec<_>>().await;

        let metas = match listing {
            Ok(metas) => metas,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut paths: Vec<String> = metas
            .iter()
            .map(|meta| self.relativize(&meta.location))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Read a whole object
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        let path = self.qualify(relative);
        let bytes = self.store.get(&path).await?.bytes().await?;
        Ok(bytes)
    }

    /// Read a whole object, `None` when it does not exist
    pub async fn get_if_exists(&self, relative: &str) -> Result<Option<Bytes>> {
        match self.get(relative).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(Error::ObjectStore(object_store::Error::NotFound { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write a whole object, replacing any existing one
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<()> {
        let path = self.qualify(relative);
        self.store.put(&path, PutPayload::from(data)).await?;
        Ok(())
    }

    /// Delete an object
    pub async fn delete(&self, relative: &str) -> Result<()> {
        let path = self.qualify(relative);
        self.store.delete(&path).await?;
        Ok(())
    }

    /// Move an object, replacing any object at the destination
    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = self.qualify(from);
        let to = self.qualify(to);
        self.store.rename(&from, &to).await?;
        Ok(())
    }

    /// Delete every object below `relative_prefix`, returning how many were removed
    pub async fn delete_prefix(&self, relative_prefix: &str) -> Result<usize> {
        let paths = self.list(relative_prefix).await?;
        for path in &paths {
            self.delete(path).await?;
        }
        Ok(paths.len())
    }
}

/// Decode `%XX` escapes in a path segment
///
/// Used both to undo object_store's segment encoding and to unescape
/// Hive partition values.
pub fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(value) = decoded {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
