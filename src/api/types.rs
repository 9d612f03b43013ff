//! Operation options and response structures

use super::error::{Result, StorageError};
use bytes::Bytes;
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;
pub const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Object visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

/// `with_bucket` / `with_region` for every options struct
macro_rules! location_builders {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// Override the configured default bucket
                pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
                    self.bucket_name = Some(bucket_name.into());
                    self
                }

                /// Override the configured default region
                pub fn with_region(mut self, region: impl Into<String>) -> Self {
                    self.region = Some(region.into());
                    self
                }
            }
        )+
    };
}

/// Options for a single-request upload
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub key: Option<String>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    /// Defaults to public
    pub visibility: Option<Visibility>,
    /// Form filename, defaults to the key
    pub filename: Option<String>,
    /// Defaults to application/octet-stream
    pub content_type: Option<String>,
}

impl UploadOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Options for operations addressing one object (delete, purge)
#[derive(Debug, Clone, Default)]
pub struct ObjectOptions {
    pub key: Option<String>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
}

impl ObjectOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }
}

/// Options for starting a multipart upload
#[derive(Debug, Clone, Default)]
pub struct StartMultipartOptions {
    pub key: Option<String>,
    pub total_parts: Option<u32>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    /// Defaults to application/octet-stream
    pub mime_type: Option<String>,
    /// Defaults to public
    pub visibility: Option<Visibility>,
}

impl StartMultipartOptions {
    pub fn new(key: impl Into<String>, total_parts: u32) -> Self {
        Self {
            key: Some(key.into()),
            total_parts: Some(total_parts),
            ..Default::default()
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// Options for uploading one part
#[derive(Debug, Clone, Default)]
pub struct UploadPartOptions {
    pub upload_id: Option<String>,
    /// 1-based
    pub part_number: Option<u32>,
    pub key: Option<String>,
    pub total_parts: Option<u32>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
}

impl UploadPartOptions {
    pub fn new(
        upload_id: impl Into<String>,
        part_number: u32,
        key: impl Into<String>,
        total_parts: u32,
    ) -> Self {
        Self {
            upload_id: Some(upload_id.into()),
            part_number: Some(part_number),
            key: Some(key.into()),
            total_parts: Some(total_parts),
            ..Default::default()
        }
    }
}

/// Options for completing a multipart upload
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartOptions {
    pub upload_id: Option<String>,
    pub key: Option<String>,
    /// Sent as given; ordering is up to the caller
    pub parts: Vec<Part>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
}

impl CompleteMultipartOptions {
    pub fn new(upload_id: impl Into<String>, key: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            upload_id: Some(upload_id.into()),
            key: Some(key.into()),
            parts,
            ..Default::default()
        }
    }
}

/// Options for cancelling a multipart upload
#[derive(Debug, Clone, Default)]
pub struct CancelMultipartOptions {
    pub upload_id: Option<String>,
    pub key: Option<String>,
    pub bucket_name: Option<String>,
    pub region: Option<String>,
}

impl CancelMultipartOptions {
    pub fn new(upload_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            upload_id: Some(upload_id.into()),
            key: Some(key.into()),
            ..Default::default()
        }
    }
}

/// Options for listing bucket contents
#[derive(Debug, Clone, Default)]
pub struct ListContentsOptions {
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    /// Defaults to ""
    pub prefix: Option<String>,
    /// Defaults to 1
    pub page: Option<u32>,
    /// Defaults to 20
    pub limit: Option<u32>,
}

impl ListContentsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Loose option record for tag-dispatched signed URLs.
/// Which fields are required depends on the operation tag.
#[derive(Debug, Clone, Default)]
pub struct SignedUrlOptions {
    pub bucket_name: Option<String>,
    pub region: Option<String>,
    pub key: Option<String>,
    pub visibility: Option<Visibility>,
    pub total_parts: Option<u32>,
    pub mime_type: Option<String>,
    pub upload_id: Option<String>,
    pub part_number: Option<u32>,
    pub expires_in: Option<u64>,
}

impl SignedUrlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_upload_id(mut self, upload_id: impl Into<String>) -> Self {
        self.upload_id = Some(upload_id.into());
        self
    }

    pub fn with_part_number(mut self, part_number: u32) -> Self {
        self.part_number = Some(part_number);
        self
    }

    pub fn with_total_parts(mut self, total_parts: u32) -> Self {
        self.total_parts = Some(total_parts);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }
}

location_builders!(
    UploadOptions,
    ObjectOptions,
    StartMultipartOptions,
    UploadPartOptions,
    CompleteMultipartOptions,
    CancelMultipartOptions,
    ListContentsOptions,
    SignedUrlOptions,
);

// =============================================================================
// Multipart Upload Types
// =============================================================================

/// Part reference for completing a multipart upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Tag returned when the part was uploaded
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Part number, starting at 1
    #[serde(rename = "PartNumber")]
    pub part_number: u32,
}

impl Part {
    pub fn new(part_number: u32, etag: impl Into<String>) -> Self {
        Self {
            etag: etag.into(),
            part_number,
        }
    }
}

/// JSON body of the complete call
#[derive(Debug, Serialize)]
pub(crate) struct CompleteMultipartBody<'a> {
    pub parts: &'a [Part],
}

/// Body returned when a multipart upload starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartMultipartUploadResponse {
    #[serde(rename = "uploadId", alias = "upload_id", alias = "UploadId")]
    pub upload_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Body returned for one uploaded part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPartResponse {
    #[serde(rename = "ETag", alias = "etag", alias = "eTag")]
    pub etag: String,
    #[serde(
        rename = "PartNumber",
        alias = "partNumber",
        alias = "part_number",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub part_number: Option<u32>,
}

impl UploadPartResponse {
    /// Turn the response into a `Part`, using `part_number` when the server omitted it
    pub fn into_part(self, part_number: u32) -> Part {
        Part::new(self.part_number.unwrap_or(part_number), self.etag)
    }
}

/// Successful response, body untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: Bytes) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| StorageError::Decode(e.to_string()))
    }
}

/// Result of signed-URL generation.
///
/// Every operation yields a URL except `download`, which is answered by the
/// server directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedUrl {
    Url(String),
    Response(Response),
}

impl SignedUrl {
    pub fn url(&self) -> Option<&str> {
        match self {
            SignedUrl::Url(url) => Some(url),
            SignedUrl::Response(_) => None,
        }
    }

    pub fn into_url(self) -> Option<String> {
        match self {
            SignedUrl::Url(url) => Some(url),
            SignedUrl::Response(_) => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            SignedUrl::Url(_) => None,
            SignedUrl::Response(response) => Some(response),
        }
    }
}
