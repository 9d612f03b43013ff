//! Storage client with file, multipart and bucket operations
//!
//! Every operation validates its required fields, builds the path and query
//! string in wire order, signs `METHOD\nPATH\nTIMESTAMP` and performs at most
//! one request. Nothing is retried here.
//!
//! Clone is cheap - configuration and transport sit behind `Arc`.

use super::error::{Result, StorageError};
use super::form::MultipartForm;
use super::paths;
use super::query::{encode_segment, require, require_count, resolve, QueryParams};
use super::signed_url::{SignedOperation, SignedUrlRequest};
use super::signer::{RequestSigner, SignedRequest};
use super::types::{
    CancelMultipartOptions, CompleteMultipartBody, CompleteMultipartOptions, ListContentsOptions,
    ObjectOptions, Response, SignedUrl, SignedUrlOptions, StartMultipartOptions, UploadOptions,
    UploadPartOptions, DEFAULT_CONTENT_TYPE, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use crate::config::{self, ClientConfig};
use crate::transport::{HttpRequest, HyperTransport, Payload, RequestBody, Transport};
use hyper::Method;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Operation names as they appear in validation errors
pub(crate) mod ops {
    pub const UPLOAD: &str = "upload";
    pub const DELETE: &str = "delete";
    pub const PURGE: &str = "purge";
    pub const START_MULTIPART: &str = "start_multipart_upload";
    pub const UPLOAD_PART: &str = "upload_part";
    pub const COMPLETE_MULTIPART: &str = "complete_multipart_upload";
    pub const CANCEL_MULTIPART: &str = "cancel_multipart_upload";
}

/// Object storage client
#[derive(Clone)]
pub struct StorageClient {
    config: Arc<ClientConfig>,
    signer: RequestSigner,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Create a client using the default hyper transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HyperTransport::new()?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client from `OBJSTORE_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config = config::load_from_env()?;
        Ok(Self::new(config)?)
    }

    pub fn with_transport<T>(config: ClientConfig, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Share one transport (and its connection pool) between clients
    pub fn with_shared_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let signer = RequestSigner::from_config(&config);
        Self {
            config: Arc::new(config),
            signer,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Upload, delete, purge and multipart operations
    pub fn files(&self) -> FileOperations<'_> {
        FileOperations { client: self }
    }

    /// Bucket-level operations
    pub fn bucket(&self) -> BucketOperations<'_> {
        BucketOperations { client: self }
    }

    /// Sign a path (query included) with the configured secret
    pub fn sign(&self, method: &str, path: &str, timestamp: Option<&str>) -> SignedRequest {
        self.signer.sign(method, path, timestamp)
    }

    /// `X-Access-Key`, `X-Signature` and `X-Timestamp` for a request built elsewhere
    pub fn auth_headers(&self, method: &str, path: &str) -> [(&'static str, String); 3] {
        self.signer.auth_headers(method, path)
    }

    /// Generate a pre-signed URL for `request`.
    ///
    /// No I/O happens except for `download`, which asks the server directly
    /// and returns its response.
    pub async fn generate_signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUrl> {
        request.operation.validate()?;
        let path = self.signed_path(request);

        match request.operation {
            SignedOperation::Download { .. } => {
                let response = self
                    .execute(Method::GET, path, RequestBody::Empty, Vec::new())
                    .await?;
                Ok(SignedUrl::Response(response))
            }
            _ => {
                let method = request.operation.method();
                Ok(SignedUrl::Url(self.presign(method.as_str(), &path, None)))
            }
        }
    }

    /// Tag-dispatched variant of [`generate_signed_url`](Self::generate_signed_url)
    pub async fn generate_signed_url_for(
        &self,
        kind: &str,
        options: &SignedUrlOptions,
    ) -> Result<SignedUrl> {
        let request = SignedUrlRequest::from_tag(kind, options)?;
        self.generate_signed_url(&request).await
    }

    /// Build a pre-signed URL without I/O, optionally at a fixed timestamp.
    ///
    /// `download` produces no URL and is rejected.
    pub fn presign_url(&self, request: &SignedUrlRequest, timestamp: Option<&str>) -> Result<String> {
        if let SignedOperation::Download { .. } = request.operation {
            return Err(StorageError::UnsupportedOperation(
                request.operation.kind().to_string(),
            ));
        }
        request.operation.validate()?;

        let path = self.signed_path(request);
        let method = request.operation.method();
        Ok(self.presign(method.as_str(), &path, timestamp))
    }

    fn signed_path(&self, request: &SignedUrlRequest) -> String {
        let mut query = self.location(request.bucket_name.as_deref(), request.region.as_deref());
        request.operation.append_query(&mut query);
        query.append_to(&request.operation.path())
    }

    /// Append `access_key`, `signature` and `timestamp` to an already complete path
    fn presign(&self, method: &str, path_and_query: &str, timestamp: Option<&str>) -> String {
        let mut auth = QueryParams::new();
        auth.extend(self.signer.auth_query(method, path_and_query, timestamp));

        let separator = if path_and_query.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}{}",
            self.config.base_url(),
            path_and_query,
            separator,
            auth.encode()
        )
    }

    /// `bucket_name` and `region`, argument first, then configuration
    fn location(&self, bucket_name: Option<&str>, region: Option<&str>) -> QueryParams {
        QueryParams::with_location(
            resolve(bucket_name, self.config.default_bucket(), ""),
            resolve(region, self.config.region(), ""),
        )
    }

    async fn send_form(
        &self,
        method: Method,
        path_and_query: String,
        form: MultipartForm,
        payload: Payload,
    ) -> Result<Response> {
        let headers = vec![("Content-Type".to_string(), form.content_type_header())];
        let body = form.encode(payload);
        self.execute(method, path_and_query, body, headers).await
    }

    /// Sign, dispatch and map the response
    async fn execute(
        &self,
        method: Method,
        path_and_query: String,
        body: RequestBody,
        mut headers: Vec<(String, String)>,
    ) -> Result<Response> {
        let auth = self.signer.auth_headers(method.as_str(), &path_and_query);
        headers.extend(auth.into_iter().map(|(k, v)| (k.to_string(), v)));

        if !matches!(body, RequestBody::Empty) {
            if let Some(length) = body.len() {
                headers.push(("Content-Length".to_string(), length.to_string()));
            }
        }

        tracing::debug!(method = %method, path = %path_and_query, "dispatching request");

        let url = format!("{}{}", self.config.base_url(), path_and_query);
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        if !response.status.is_success() {
            tracing::debug!(status = response.status.as_u16(), "request rejected");
            return Err(StorageError::from_response(response.status, &response.body));
        }

        Ok(Response::new(response.status, response.body))
    }
}

/// File operations, borrowed from a [`StorageClient`]
#[derive(Debug, Clone, Copy)]
pub struct FileOperations<'a> {
    client: &'a StorageClient,
}

impl<'a> FileOperations<'a> {
    /// Upload a file in a single request
    pub async fn upload(&self, payload: impl Into<Payload>, options: &UploadOptions) -> Result<Response> {
        let key = require(options.key.as_deref(), "key", ops::UPLOAD)?;
        let filename = resolve(options.filename.as_deref(), None, key);
        let content_type = resolve(options.content_type.as_deref(), None, DEFAULT_CONTENT_TYPE);

        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query
            .push("key", key)
            .push("visibility", options.visibility.unwrap_or_default());

        self.client
            .send_form(
                Method::PUT,
                query.append_to(paths::UPLOAD),
                MultipartForm::new(filename, content_type),
                payload.into(),
            )
            .await
    }

    /// Stream a local file. The form filename defaults to the file's name.
    pub async fn upload_file(&self, path: impl AsRef<Path>, options: &UploadOptions) -> Result<Response> {
        let path = path.as_ref();
        require(options.key.as_deref(), "key", ops::UPLOAD)?;

        let payload = Payload::from_path(path).await?;
        let mut options = options.clone();
        if options.filename.is_none() {
            options.filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }

        self.upload(payload, &options).await
    }

    pub async fn delete(&self, options: &ObjectOptions) -> Result<Response> {
        let query = self.object_query(options, ops::DELETE)?;
        self.client
            .execute(Method::DELETE, query.append_to(paths::DELETE), RequestBody::Empty, Vec::new())
            .await
    }

    /// Invalidate cached copies of an object
    pub async fn purge(&self, options: &ObjectOptions) -> Result<Response> {
        let query = self.object_query(options, ops::PURGE)?;
        self.client
            .execute(Method::POST, query.append_to(paths::PURGE), RequestBody::Empty, Vec::new())
            .await
    }

    fn object_query(&self, options: &ObjectOptions, operation: &'static str) -> Result<QueryParams> {
        let key = require(options.key.as_deref(), "key", operation)?;
        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query.push("key", key);
        Ok(query)
    }

    // =========================================================================
    // Multipart Upload Operations
    // =========================================================================

    /// Start a multipart upload. The response carries the upload ID.
    pub async fn start_multipart_upload(&self, options: &StartMultipartOptions) -> Result<Response> {
        let key = require(options.key.as_deref(), "key", ops::START_MULTIPART)?;
        let total_parts = require_count(options.total_parts, "total_parts", ops::START_MULTIPART)?;
        let mime_type = resolve(options.mime_type.as_deref(), None, DEFAULT_CONTENT_TYPE);

        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query
            .push("key", key)
            .push("total_parts", total_parts)
            .push("mime_type", mime_type)
            .push("visibility", options.visibility.unwrap_or_default());

        self.client
            .execute(
                Method::POST,
                query.append_to(paths::MULTIPART_START),
                RequestBody::Empty,
                Vec::new(),
            )
            .await
    }

    /// Upload one part. Part numbers start at 1; sequencing is up to the caller.
    pub async fn upload_part(
        &self,
        payload: impl Into<Payload>,
        options: &UploadPartOptions,
    ) -> Result<Response> {
        let upload_id = require(options.upload_id.as_deref(), "upload_id", ops::UPLOAD_PART)?;
        let part_number = require_count(options.part_number, "part_number", ops::UPLOAD_PART)?;
        let key = require(options.key.as_deref(), "key", ops::UPLOAD_PART)?;
        let total_parts = require_count(options.total_parts, "total_parts", ops::UPLOAD_PART)?;

        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query
            .push("part_number", part_number)
            .push("key", key)
            .push("total_parts", total_parts);

        self.client
            .send_form(
                Method::POST,
                query.append_to(&paths::multipart(&encode_segment(upload_id))),
                MultipartForm::new(key, DEFAULT_CONTENT_TYPE),
                payload.into(),
            )
            .await
    }

    /// Complete a multipart upload. Parts are sent in the order given.
    pub async fn complete_multipart_upload(
        &self,
        options: &CompleteMultipartOptions,
    ) -> Result<Response> {
        let upload_id = require(
            options.upload_id.as_deref(),
            "upload_id",
            ops::COMPLETE_MULTIPART,
        )?;
        let key = require(options.key.as_deref(), "key", ops::COMPLETE_MULTIPART)?;
        if options.parts.is_empty() {
            return Err(StorageError::missing("parts", ops::COMPLETE_MULTIPART));
        }

        let body = serde_json::to_vec(&CompleteMultipartBody {
            parts: &options.parts,
        })
        .map_err(|e| StorageError::Encode(e.to_string()))?;

        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query.push("key", key);

        self.client
            .execute(
                Method::POST,
                query.append_to(&paths::multipart_complete(&encode_segment(upload_id))),
                RequestBody::Bytes(body.into()),
                vec![("Content-Type".to_string(), "application/json".to_string())],
            )
            .await
    }

    /// Cancel a multipart upload and discard its parts
    pub async fn cancel_multipart_upload(&self, options: &CancelMultipartOptions) -> Result<Response> {
        let upload_id = require(options.upload_id.as_deref(), "upload_id", ops::CANCEL_MULTIPART)?;
        let key = require(options.key.as_deref(), "key", ops::CANCEL_MULTIPART)?;

        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query.push("key", key);

        self.client
            .execute(
                Method::DELETE,
                query.append_to(&paths::multipart(&encode_segment(upload_id))),
                RequestBody::Empty,
                Vec::new(),
            )
            .await
    }
}

/// Bucket operations, borrowed from a [`StorageClient`]
#[derive(Debug, Clone, Copy)]
pub struct BucketOperations<'a> {
    client: &'a StorageClient,
}

impl<'a> BucketOperations<'a> {
    /// List a page of bucket contents
    pub async fn list_contents(&self, options: &ListContentsOptions) -> Result<Response> {
        let mut query = self
            .client
            .location(options.bucket_name.as_deref(), options.region.as_deref());
        query
            .push("prefix", options.prefix.as_deref().unwrap_or(""))
            .push("page", options.page.unwrap_or(DEFAULT_PAGE))
            .push("limit", options.limit.unwrap_or(DEFAULT_LIMIT));

        self.client
            .execute(
                Method::GET,
                query.append_to(paths::CONTENTS),
                RequestBody::Empty,
                Vec::new(),
            )
            .await
    }
}
