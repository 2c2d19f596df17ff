//! Object storage abstraction for media uploads.
//!
//! Media lives in two buckets: a public one for free content, previews and
//! resized variants, and a private one for the originals of paid content.
//! Private objects are only reachable through time-limited signed URLs.
//! Supports both local filesystem and S3-compatible object storage.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Which bucket an object lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// Publicly readable objects.
    Public,
    /// Objects that require a signed URL.
    Private,
}

impl Bucket {
    /// Path segment used by the local backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// Parse a bucket path segment.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Local {
        /// Base path for stored files.
        base_path: PathBuf,
        /// Base URL for serving files.
        base_url: String,
        /// Secret used to sign private URLs.
        signing_secret: String,
    },
    /// S3-compatible object storage.
    S3 {
        /// S3 endpoint URL (e.g., "<https://s3.amazonaws.com>" or `MinIO` URL).
        endpoint: String,
        /// AWS region.
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Bucket for public objects.
        public_bucket: String,
        /// Bucket for private objects.
        private_bucket: String,
        /// Public URL prefix for serving public objects.
        public_url: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Local {
            base_path: PathBuf::from("./files"),
            base_url: "/files".to_string(),
            signing_secret: "change-me".to_string(),
        }
    }
}

impl StorageConfig {
    /// Build the configured backend.
    pub async fn build(&self) -> AppResult<Arc<dyn StorageBackend>> {
        match self {
            Self::Local {
                base_path,
                base_url,
                signing_secret,
            } => Ok(Arc::new(LocalStorage::new(
                base_path.clone(),
                base_url.clone(),
                signing_secret.clone(),
            ))),
            #[cfg(feature = "s3")]
            Self::S3 {
                endpoint,
                region,
                access_key_id,
                secret_access_key,
                public_bucket,
                private_bucket,
                public_url,
            } => Ok(Arc::new(
                S3Storage::new(
                    endpoint,
                    region,
                    access_key_id,
                    secret_access_key,
                    public_bucket.clone(),
                    private_bucket.clone(),
                    public_url.clone(),
                )
                .await?,
            )),
            #[cfg(not(feature = "s3"))]
            Self::S3 { .. } => Err(AppError::Config(
                "S3 storage requires the `s3` feature".to_string(),
            )),
        }
    }
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path or object key).
    pub key: String,
    /// Bucket the object was written to.
    pub bucket: Bucket,
    /// Public URL, only set for the public bucket.
    pub url: Option<String>,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Upload a file.
    async fn upload(
        &self,
        bucket: Bucket,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile>;

    /// Delete a file. Missing files are not an error.
    async fn delete(&self, bucket: Bucket, key: &str) -> AppResult<()>;

    /// Read a file back.
    async fn read(&self, bucket: Bucket, key: &str) -> AppResult<Vec<u8>>;

    /// Get the public URL for a key in the public bucket.
    fn public_url(&self, key: &str) -> String;

    /// Create a time-limited URL for a key in the private bucket.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> AppResult<String>;

    /// Check a signature produced by [`StorageBackend::signed_url`].
    ///
    /// Only backends that serve private objects themselves implement this.
    fn verify_signed_url(&self, _key: &str, _expires: i64, _signature: &str) -> bool {
        false
    }

    /// Check if a file exists.
    async fn exists(&self, bucket: Bucket, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signing_secret: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String, signing_secret: String) -> Self {
        Self {
            base_path,
            base_url,
            signing_secret,
        }
    }

    fn path_for(&self, bucket: Bucket, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(AppError::BadRequest(format!("Invalid storage key: {key}")));
        }
        Ok(self.base_path.join(bucket.as_str()).join(relative))
    }

    fn sign(&self, key: &str, expires: i64) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid signing secret: {e}")))?;
        mac.update(format!("{key}:{expires}").as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        bucket: Bucket,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.path_for(bucket, key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            bucket,
            url: (bucket == Bucket::Public).then(|| self.public_url(key)),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> AppResult<()> {
        let path = self.path_for(bucket, key)?;
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    async fn read(&self, bucket: Bucket, key: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("File {key}")))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to read file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/public/{}", self.base_url.trim_end_matches('/'), encode_key(key))
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        let expires = chrono::Utc::now().timestamp() + expires_in.as_secs() as i64;
        let signature = self.sign(key, expires)?;
        Ok(format!(
            "{}/private/{}?expires={}&signature={}",
            self.base_url.trim_end_matches('/'),
            encode_key(key),
            expires,
            signature
        ))
    }

    fn verify_signed_url(&self, key: &str, expires: i64, signature: &str) -> bool {
        if expires < chrono::Utc::now().timestamp() {
            return false;
        }
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(self.signing_secret.as_bytes()) else {
            return false;
        };
        mac.update(format!("{key}:{expires}").as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    async fn exists(&self, bucket: Bucket, key: &str) -> AppResult<bool> {
        Ok(self.path_for(bucket, key)?.exists())
    }
}

/// S3-compatible object storage backend.
#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    public_bucket: String,
    private_bucket: String,
    public_url: Option<String>,
}

#[cfg(feature = "s3")]
impl S3Storage {
    /// Create a new S3 storage backend.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        public_bucket: String,
        private_bucket: String,
        public_url: Option<String>,
    ) -> AppResult<Self> {
        use aws_config::Region;
        use aws_sdk_s3::config::Credentials;

        let credentials =
            Credentials::new(access_key_id, secret_access_key, None, None, "galeria");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: aws_sdk_s3::Client::from_conf(config),
            public_bucket,
            private_bucket,
            public_url,
        })
    }

    fn bucket_name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Public => &self.public_bucket,
            Bucket::Private => &self.private_bucket,
        }
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl StorageBackend for S3Storage {
    async fn upload(
        &self,
        bucket: Bucket,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        use aws_sdk_s3::primitives::ByteStream;

        let md5 = format!("{:x}", md5::compute(data));

        self.client
            .put_object()
            .bucket(self.bucket_name(bucket))
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            bucket,
            url: (bucket == Bucket::Public).then(|| self.public_url(key)),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, bucket: Bucket, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(self.bucket_name(bucket))
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    async fn read(&self, bucket: Bucket, key: &str) -> AppResult<Vec<u8>> {
        let object = self
            .client
            .get_object()
            .bucket(self.bucket_name(bucket))
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 get_object failed: {e}")))?;

        let body = object
            .body
            .collect()
            .await
            .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
        Ok(body.into_bytes().to_vec())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), encode_key(key)),
            None => format!(
                "https://{}.s3.amazonaws.com/{}",
                self.public_bucket,
                encode_key(key)
            ),
        }
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> AppResult<String> {
        use aws_sdk_s3::presigning::PresigningConfig;

        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| AppError::Storage(format!("Invalid presign expiry: {e}")))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.private_bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Storage(format!("S3 presign failed: {e}")))?;

        Ok(request.uri().to_string())
    }

    async fn exists(&self, bucket: Bucket, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(self.bucket_name(bucket))
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!("S3 head_object failed: {e}")))
                }
            }
        }
    }
}

/// Percent-encode each segment of a key for use in a URL path.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Generate a unique storage key for an uploaded file.
///
/// `owner` should be a stable id; characters outside `[A-Za-z0-9_-]` are replaced.
#[must_use]
pub fn generate_storage_key(owner: &str, original_name: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();

    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    let owner: String = owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    format!(
        "{}/{}/{}_{}.{}",
        date_path,
        owner,
        now.timestamp_millis(),
        uuid::Uuid::new_v4().simple(),
        extension
    )
}

/// Derive the key of a processed variant from the original's key.
///
/// `2025/01/01/01J0USER/123_abc.png` with suffix `w300` becomes
/// `2025/01/01/01J0USER/123_abc_w300.jpg`.
#[must_use]
pub fn variant_key(key: &str, suffix: &str, extension: &str) -> String {
    let stem = key
        .rfind('.')
        .filter(|&pos| !key[pos..].contains('/'))
        .map_or(key, |pos| &key[..pos]);
    format!("{stem}_{suffix}.{extension}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn local(dir: &str) -> LocalStorage {
        LocalStorage::new(
            std::env::temp_dir().join(dir),
            "http://localhost:3000/files/".to_string(),
            "test-secret".to_string(),
        )
    }

    #[test]
    fn test_generate_storage_key() {
        let key = generate_storage_key("alice", "Photo.JPG");
        assert!(key.contains("/alice/"));
        assert!(key.ends_with(".jpg"));
    }

    #[test]
    fn test_generate_storage_key_replaces_url_characters() {
        let key = generate_storage_key("ana?x#1/../", "pic.png");
        let owner = key.split('/').nth(3).unwrap();
        assert_eq!(owner, "ana_x_1____");
        assert!(!key.contains(['?', '#']));
        assert!(!key.contains("/../"));
    }

    #[test]
    fn test_urls_percent_encode_key_segments() {
        let storage = local("galeria-encode-test");
        assert_eq!(
            storage.public_url("a b/c?d#e.jpg"),
            "http://localhost:3000/files/public/a%20b/c%3Fd%23e.jpg"
        );
    }

    #[tokio::test]
    async fn test_signed_url_query_is_not_polluted_by_key() {
        let storage = local("galeria-encode-sign-test");
        let url = storage
            .signed_url("x/y?expires=0.jpg", Duration::from_secs(60))
            .await
            .unwrap();

        let (path, query) = url.split_once('?').unwrap();
        assert!(path.ends_with("/private/x/y%3Fexpires%3D0.jpg"));
        assert!(query.starts_with("expires="));
        assert!(!query.starts_with("expires=0&"));
    }

    #[test]
    fn test_generate_storage_key_no_extension() {
        let key = generate_storage_key("alice", "file");
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_variant_key() {
        assert_eq!(
            variant_key("2025/01/01/alice/1_abc.png", "w300", "jpg"),
            "2025/01/01/alice/1_abc_w300.jpg"
        );
        assert_eq!(variant_key("a.b/file", "blur", "jpg"), "a.b/file_blur.jpg");
    }

    #[test]
    fn test_public_url_uses_public_prefix() {
        let storage = local("galeria-url-test");
        assert_eq!(
            storage.public_url("a/b.jpg"),
            "http://localhost:3000/files/public/a/b.jpg"
        );
    }

    #[test]
    fn test_rejects_traversal_keys() {
        let storage = local("galeria-traversal-test");
        assert!(storage.path_for(Bucket::Public, "../etc/passwd").is_err());
        assert!(storage.path_for(Bucket::Public, "/abs").is_err());
        assert!(storage.path_for(Bucket::Private, "ok/key.jpg").is_ok());
    }

    #[tokio::test]
    async fn test_signed_url_round_trip() {
        let storage = local("galeria-sign-test");
        let url = storage
            .signed_url("x/y.jpg", Duration::from_secs(3600))
            .await
            .unwrap();

        let query = url.split_once('?').unwrap().1;
        let mut expires = 0;
        let mut signature = String::new();
        for pair in query.split('&') {
            match pair.split_once('=').unwrap() {
                ("expires", v) => expires = v.parse().unwrap(),
                ("signature", v) => signature = v.to_string(),
                _ => {}
            }
        }

        assert!(storage.verify_signed_url("x/y.jpg", expires, &signature));
        assert!(!storage.verify_signed_url("x/other.jpg", expires, &signature));
        assert!(!storage.verify_signed_url("x/y.jpg", expires + 1, &signature));
    }

    #[test]
    fn test_expired_signature_is_rejected() {
        let storage = local("galeria-expired-test");
        let expires = chrono::Utc::now().timestamp() - 10;
        let signature = storage.sign("x/y.jpg", expires).unwrap();
        assert!(!storage.verify_signed_url("x/y.jpg", expires, &signature));
    }

    #[tokio::test]
    async fn test_upload_read_delete() {
        let storage = local("galeria-io-test");
        let uploaded = storage
            .upload(Bucket::Private, "t/file.bin", b"hello", "application/octet-stream")
            .await
            .unwrap();
        assert!(uploaded.url.is_none());
        assert_eq!(uploaded.size, 5);

        assert_eq!(
            storage.read(Bucket::Private, "t/file.bin").await.unwrap(),
            b"hello"
        );
        assert!(!storage.exists(Bucket::Public, "t/file.bin").await.unwrap());

        storage.delete(Bucket::Private, "t/file.bin").await.unwrap();
        assert!(!storage.exists(Bucket::Private, "t/file.bin").await.unwrap());
    }
}
