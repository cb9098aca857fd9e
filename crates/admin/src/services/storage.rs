//! Image uploads for catalog records.
//!
//! Uploaded images are written through an [`ObjectStore`] under
//! `admin_uploads/{unix_millis}_{file name}` and referenced by the public URL
//! the store returns. Two stores exist:
//!
//! - [`LocalObjectStore`] writes below `UPLOAD_DIR`, which the storefront
//!   serves at `/uploads`.
//! - [`HttpObjectStore`] sends an authenticated `PUT` to an object store
//!   endpoint.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Largest accepted image (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Key prefix for everything uploaded from the console.
pub const UPLOAD_PREFIX: &str = "admin_uploads";

/// Raster formats accepted for upload: content type and file extensions.
const ALLOWED_IMAGES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/webp", &["webp"]),
    ("image/gif", &["gif"]),
];

/// Errors from validating or storing an upload.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The part is not a JPEG, PNG, WebP or GIF image.
    #[error("unsupported image: {0}")]
    NotAnImage(String),

    /// The part exceeds [`MAX_IMAGE_BYTES`].
    #[error("image is {0} bytes, limit is {MAX_IMAGE_BYTES}")]
    TooLarge(usize),

    /// The object key would escape the upload directory.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Writing to local disk failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The object store request failed.
    #[error("object store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl StorageError {
    /// Whether the upload itself was unacceptable, as opposed to the store
    /// failing.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::NotAnImage(_) | Self::TooLarge(_))
    }
}

/// An image file part from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Reject anything but raster images with a matching-kind extension,
    /// and oversized files.
    ///
    /// The storefront serves uploads with a type guessed from the extension,
    /// so the extension is checked as well as the declared type.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotAnImage` or `StorageError::TooLarge`.
    pub fn validate(&self) -> Result<(), StorageError> {
        let content_type = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ALLOWED_IMAGES.iter().any(|(allowed, _)| *allowed == content_type) {
            return Err(StorageError::NotAnImage(self.content_type.clone()));
        }
        let extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_IMAGES
            .iter()
            .any(|(_, extensions)| extensions.contains(&extension.as_str()))
        {
            return Err(StorageError::NotAnImage(self.file_name.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge(self.bytes.len()));
        }
        Ok(())
    }

    /// Object key for this file uploaded at `now`.
    #[must_use]
    pub fn key(&self, now: DateTime<Utc>) -> String {
        upload_key(now, &self.file_name)
    }
}

/// `admin_uploads/{unix_millis}_{name}` with whitespace in the name replaced
/// by `_`. Only the last path segment of the client's file name is used.
#[must_use]
pub fn upload_key(now: DateTime<Utc>, file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let base = if base.is_empty() || base == "." || base == ".." {
        "image"
    } else {
        base
    };
    let name: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{UPLOAD_PREFIX}/{}_{name}", now.timestamp_millis())
}

/// Percent-encode each `/`-separated segment of an object key.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// A place to put uploaded files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL clients fetch it from.
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;
}

/// Validate `upload` and store it under a fresh key.
///
/// # Errors
///
/// Returns a rejection for bad input, or the store's failure.
pub async fn store_image(
    store: &dyn ObjectStore,
    upload: ImageUpload,
) -> Result<String, StorageError> {
    upload.validate()?;
    let key = upload.key(Utc::now());
    let url = store.put(&key, &upload.content_type, upload.bytes).await?;
    tracing::info!(key = %key, "Image uploaded");
    Ok(url)
}

// =============================================================================
// Local disk
// =============================================================================

/// Files under a directory, served elsewhere at `public_url`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    public_url: String,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !normal {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("{}/{}", self.public_url, encode_key(key)))
    }
}

// =============================================================================
// HTTP object store
// =============================================================================

/// `PUT {endpoint}/{key}` with a bearer token.
#[derive(Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    token: SecretString,
    public_url: String,
}

impl HttpObjectStore {
    /// Create a store for `endpoint`.
    #[must_use]
    pub fn new(endpoint: String, token: SecretString, public_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
            public_url,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let encoded = encode_key(key);

        self.client
            .put(format!("{}/{encoded}", self.endpoint))
            .bearer_auth(self.token.expose_secret())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;

        Ok(format!("{}/{encoded}", self.public_url))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at_millis(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn upload(content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: "badam halwa.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_upload_key_replaces_whitespace() {
        assert_eq!(
            upload_key(at_millis(1_717_000_000_123), "badam  halwa\tbox.jpg"),
            "admin_uploads/1717000000123_badam__halwa_box.jpg"
        );
    }

    #[test]
    fn test_upload_key_drops_client_directories() {
        assert_eq!(
            upload_key(at_millis(5), "C:\\Users\\shop\\kesari.png"),
            "admin_uploads/5_kesari.png"
        );
        assert_eq!(upload_key(at_millis(5), "../../"), "admin_uploads/5_image");
    }

    #[test]
    fn test_validate_content_type_and_size() {
        assert!(upload("image/jpeg", 10).validate().is_ok());
        assert!(upload("IMAGE/PNG", 10).validate().is_ok());
        assert!(upload("image/jpeg; charset=binary", 10).validate().is_ok());
        assert!(matches!(
            upload("application/pdf", 10).validate(),
            Err(StorageError::NotAnImage(_))
        ));
        assert!(matches!(
            upload("image/png", MAX_IMAGE_BYTES + 1).validate(),
            Err(StorageError::TooLarge(_))
        ));
        assert!(upload("image/png", MAX_IMAGE_BYTES).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_scriptable_images() {
        assert!(matches!(
            upload("image/svg+xml", 10).validate(),
            Err(StorageError::NotAnImage(_))
        ));

        let disguised = |file_name: &str| ImageUpload {
            file_name: file_name.to_string(),
            ..upload("image/png", 10)
        };
        assert!(disguised("halwa.PNG").validate().is_ok());
        assert!(disguised("halwa.webp").validate().is_ok());
        for name in ["logo.svg", "page.html", "halwa.png.htm", "halwa"] {
            assert!(
                matches!(disguised(name).validate(), Err(StorageError::NotAnImage(_))),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejection_classification() {
        assert!(StorageError::TooLarge(1).is_rejection());
        assert!(!StorageError::InvalidKey("x".into()).is_rejection());
    }

    #[tokio::test]
    async fn test_local_store_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");

        let url = store
            .put("admin_uploads/1_halwa.jpg", "image/jpeg", b"jpeg".to_vec())
            .await
            .unwrap();

        assert_eq!(url, "/uploads/admin_uploads/1_halwa.jpg");
        let written = std::fs::read(dir.path().join("admin_uploads/1_halwa.jpg")).unwrap();
        assert_eq!(written, b"jpeg");
    }

    #[tokio::test]
    async fn test_local_store_url_encodes_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");
        let key = upload_key(at_millis(7), "kaju #1 100%?.png");

        let url = store.put(&key, "image/png", b"png".to_vec()).await.unwrap();

        assert_eq!(url, "/uploads/admin_uploads/7_kaju_%231_100%25%3F.png");
        let written = std::fs::read(dir.path().join("admin_uploads/7_kaju_#1_100%?.png")).unwrap();
        assert_eq!(written, b"png");
    }

    #[tokio::test]
    async fn test_local_store_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");

        let result = store.put("../outside.jpg", "image/jpeg", vec![1]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        let result = store.put("/etc/passwd", "image/jpeg", vec![1]).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_store_image_rejects_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "/uploads");

        let result = store_image(&store, upload("text/html", 10)).await;
        assert!(matches!(result, Err(StorageError::NotAnImage(_))));
        assert!(!dir.path().join(UPLOAD_PREFIX).exists());
    }
}
