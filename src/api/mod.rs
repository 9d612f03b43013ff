//! File API client
//!
//! This module provides:
//! - HMAC-SHA256 request signing (header and pre-signed URL forms)
//! - Async file, multipart and bucket operations
//! - Signed-URL generation dispatched per operation type
//! - Uniform error mapping for failed responses

pub mod client;
pub mod error;
pub mod form;
pub mod query;
pub mod signed_url;
pub mod signer;
pub mod types;

// Re-export main types for convenience
pub use client::{BucketOperations, FileOperations, StorageClient};
pub use error::{Result, StorageError};
pub use form::MultipartForm;
pub use query::QueryParams;
pub use signed_url::{SignedOperation, SignedUrlKind, SignedUrlRequest};
pub use signer::{RequestSigner, SignedRequest};
pub use types::{
    CancelMultipartOptions, CompleteMultipartOptions, ListContentsOptions, ObjectOptions, Part,
    Response, SignedUrl, SignedUrlOptions, StartMultipartOptions, StartMultipartUploadResponse,
    UploadOptions, UploadPartOptions, UploadPartResponse, Visibility,
};

/// Request paths, relative to the base URL
pub mod paths {
    pub const UPLOAD: &str = "/api/v1/files/upload";
    pub const DELETE: &str = "/api/v1/files/delete";
    pub const PURGE: &str = "/api/v1/files/purge";
    pub const MULTIPART_START: &str = "/api/v1/files/multipart/start";
    pub const CONTENTS: &str = "/api/v1/files/contents";
    pub const SIGNED_URL: &str = "/api/v1/files/signed-url";

    /// Part upload and cancel; `upload_id` must already be percent-encoded
    pub fn multipart(upload_id: &str) -> String {
        format!("/api/v1/files/multipart/{}", upload_id)
    }

    pub fn multipart_complete(upload_id: &str) -> String {
        format!("/api/v1/files/multipart/{}/complete", upload_id)
    }
}
