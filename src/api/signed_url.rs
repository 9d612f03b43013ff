//! Signed-URL operations
//!
//! Each operation type is an enum variant with its own required fields, verb
//! and path template. The string tags are kept for callers that dispatch on
//! them.

use super::error::{Result, StorageError};
use super::query::{encode_segment, require, require_count, QueryParams};
use super::types::{SignedUrlOptions, Visibility, DEFAULT_EXPIRES_IN};
use super::paths;
use hyper::Method;
use std::fmt;
use std::str::FromStr;

/// Operation tag accepted by signed-URL generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignedUrlKind {
    Upload,
    Delete,
    StartMultipart,
    UploadPart,
    CompleteMultipart,
    CancelMultipart,
    Download,
}

impl SignedUrlKind {
    pub const ALL: [SignedUrlKind; 7] = [
        SignedUrlKind::Upload,
        SignedUrlKind::Delete,
        SignedUrlKind::StartMultipart,
        SignedUrlKind::UploadPart,
        SignedUrlKind::CompleteMultipart,
        SignedUrlKind::CancelMultipart,
        SignedUrlKind::Download,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignedUrlKind::Upload => "upload",
            SignedUrlKind::Delete => "delete",
            SignedUrlKind::StartMultipart => "start-multipart",
            SignedUrlKind::UploadPart => "uploadpart",
            SignedUrlKind::CompleteMultipart => "completemultipart",
            SignedUrlKind::CancelMultipart => "cancelmultipart",
            SignedUrlKind::Download => "download",
        }
    }
}

impl fmt::Display for SignedUrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignedUrlKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        SignedUrlKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StorageError::UnsupportedOperation(s.to_string()))
    }
}

/// Operation-specific part of a signed-URL request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedOperation {
    Upload {
        key: String,
        visibility: Visibility,
    },
    Delete {
        key: String,
    },
    StartMultipart {
        key: String,
        total_parts: u32,
        mime_type: String,
        visibility: Visibility,
    },
    UploadPart {
        upload_id: String,
        part_number: u32,
        key: String,
        total_parts: u32,
    },
    CompleteMultipart {
        upload_id: String,
        key: String,
    },
    CancelMultipart {
        upload_id: String,
        key: String,
    },
    /// Answered by the server directly instead of producing a URL
    Download {
        key: String,
        expires_in: u64,
    },
}

impl SignedOperation {
    /// Build the variant for `kind` from a loose option record, checking the
    /// fields that variant requires
    pub fn from_options(kind: SignedUrlKind, options: &SignedUrlOptions) -> Result<Self> {
        let op = kind.as_str();
        let key = || require(options.key.as_deref(), "key", op).map(str::to_string);
        let upload_id = || require(options.upload_id.as_deref(), "upload_id", op).map(str::to_string);

        let operation = match kind {
            SignedUrlKind::Upload => SignedOperation::Upload {
                key: key()?,
                visibility: options.visibility.unwrap_or_default(),
            },
            SignedUrlKind::Delete => SignedOperation::Delete { key: key()? },
            SignedUrlKind::StartMultipart => {
                let key = key()?;
                let total_parts = require_count(options.total_parts, "total_parts", op)?;
                let mime_type = require(options.mime_type.as_deref(), "mime_type", op)?;
                SignedOperation::StartMultipart {
                    key,
                    total_parts,
                    mime_type: mime_type.to_string(),
                    visibility: options.visibility.unwrap_or_default(),
                }
            }
            SignedUrlKind::UploadPart => {
                let upload_id = upload_id()?;
                let part_number = require_count(options.part_number, "part_number", op)?;
                let key = key()?;
                let total_parts = require_count(options.total_parts, "total_parts", op)?;
                SignedOperation::UploadPart {
                    upload_id,
                    part_number,
                    key,
                    total_parts,
                }
            }
            SignedUrlKind::CompleteMultipart => SignedOperation::CompleteMultipart {
                upload_id: upload_id()?,
                key: key()?,
            },
            SignedUrlKind::CancelMultipart => SignedOperation::CancelMultipart {
                upload_id: upload_id()?,
                key: key()?,
            },
            SignedUrlKind::Download => SignedOperation::Download {
                key: key()?,
                expires_in: options.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            },
        };

        Ok(operation)
    }

    pub fn kind(&self) -> SignedUrlKind {
        match self {
            SignedOperation::Upload { .. } => SignedUrlKind::Upload,
            SignedOperation::Delete { .. } => SignedUrlKind::Delete,
            SignedOperation::StartMultipart { .. } => SignedUrlKind::StartMultipart,
            SignedOperation::UploadPart { .. } => SignedUrlKind::UploadPart,
            SignedOperation::CompleteMultipart { .. } => SignedUrlKind::CompleteMultipart,
            SignedOperation::CancelMultipart { .. } => SignedUrlKind::CancelMultipart,
            SignedOperation::Download { .. } => SignedUrlKind::Download,
        }
    }

    /// Verb the URL holder will use
    pub fn method(&self) -> Method {
        match self {
            SignedOperation::Upload { .. } => Method::PUT,
            SignedOperation::Delete { .. } | SignedOperation::CancelMultipart { .. } => {
                Method::DELETE
            }
            SignedOperation::StartMultipart { .. }
            | SignedOperation::UploadPart { .. }
            | SignedOperation::CompleteMultipart { .. } => Method::POST,
            SignedOperation::Download { .. } => Method::GET,
        }
    }

    pub fn path(&self) -> String {
        match self {
            SignedOperation::Upload { .. } => paths::UPLOAD.to_string(),
            SignedOperation::Delete { .. } => paths::DELETE.to_string(),
            SignedOperation::StartMultipart { .. } => paths::MULTIPART_START.to_string(),
            SignedOperation::UploadPart { upload_id, .. }
            | SignedOperation::CancelMultipart { upload_id, .. } => {
                paths::multipart(&encode_segment(upload_id))
            }
            SignedOperation::CompleteMultipart { upload_id, .. } => {
                paths::multipart_complete(&encode_segment(upload_id))
            }
            SignedOperation::Download { .. } => paths::SIGNED_URL.to_string(),
        }
    }

    /// Append operation parameters in wire order, after bucket and region
    pub fn append_query(&self, query: &mut QueryParams) {
        match self {
            SignedOperation::Upload { key, visibility } => {
                query.push("key", key).push("visibility", visibility);
            }
            SignedOperation::Delete { key }
            | SignedOperation::CompleteMultipart { key, .. }
            | SignedOperation::CancelMultipart { key, .. } => {
                query.push("key", key);
            }
            SignedOperation::StartMultipart {
                key,
                total_parts,
                mime_type,
                visibility,
            } => {
                query
                    .push("key", key)
                    .push("total_parts", total_parts)
                    .push("mime_type", mime_type)
                    .push("visibility", visibility);
            }
            SignedOperation::UploadPart {
                part_number,
                key,
                total_parts,
                ..
            } => {
                query
                    .push("part_number", part_number)
                    .push("key", key)
                    .push("total_parts", total_parts);
            }
            SignedOperation::Download { key, expires_in } => {
                query.push("key", key).push("expires_in", expires_in);
            }
        }
    }

    /// Reject empty strings and zero counts in directly constructed variants
    pub fn validate(&self) -> Result<()> {
        let op = self.kind().as_str();
        match self {
            SignedOperation::Upload { key, .. }
            | SignedOperation::Delete { key }
            | SignedOperation::Download { key, .. } => {
                require(Some(key.as_str()), "key", op)?;
            }
            SignedOperation::StartMultipart {
                key,
                total_parts,
                mime_type,
                ..
            } => {
                require(Some(key.as_str()), "key", op)?;
                require_count(Some(*total_parts), "total_parts", op)?;
                require(Some(mime_type.as_str()), "mime_type", op)?;
            }
            SignedOperation::UploadPart {
                upload_id,
                part_number,
                key,
                total_parts,
            } => {
                require(Some(upload_id.as_str()), "upload_id", op)?;
                require_count(Some(*part_number), "part_number", op)?;
                require(Some(key.as_str()), "key", op)?;
                require_count(Some(*total_parts), "total_parts", op)?;
            }
            SignedOperation::CompleteMultipart { upload_id, key }
            | SignedOperation::CancelMultipart { upload_id, key } => {
                require(Some(upload_id.as_str()), "upload_id", op)?;
                require(Some(key.as_str()), "key", op)?;
            }
        }
        Ok(())
    }
}

/// Signed-URL request: target location plus operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlRequest {
    /// Falls back to the configured default bucket
    pub bucket_name: Option<String>,
    /// Falls back to the configured default region
    pub region: Option<String>,
    pub operation: SignedOperation,
}

impl SignedUrlRequest {
    pub fn new(operation: SignedOperation) -> Self {
        Self {
            bucket_name: None,
            region: None,
            operation,
        }
    }

    /// Parse the tag and build the matching variant from `options`
    pub fn from_tag(kind: &str, options: &SignedUrlOptions) -> Result<Self> {
        let kind: SignedUrlKind = kind.parse()?;
        let operation = SignedOperation::from_options(kind, options)?;
        Ok(Self {
            bucket_name: options.bucket_name.clone(),
            region: options.region.clone(),
            operation,
        })
    }

    pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn upload(key: impl Into<String>, visibility: Visibility) -> Self {
        Self::new(SignedOperation::Upload {
            key: key.into(),
            visibility,
        })
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self::new(SignedOperation::Delete { key: key.into() })
    }

    pub fn start_multipart(
        key: impl Into<String>,
        total_parts: u32,
        mime_type: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self::new(SignedOperation::StartMultipart {
            key: key.into(),
            total_parts,
            mime_type: mime_type.into(),
            visibility,
        })
    }

    pub fn upload_part(
        upload_id: impl Into<String>,
        part_number: u32,
        key: impl Into<String>,
        total_parts: u32,
    ) -> Self {
        Self::new(SignedOperation::UploadPart {
            upload_id: upload_id.into(),
            part_number,
            key: key.into(),
            total_parts,
        })
    }

    pub fn complete_multipart(upload_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(SignedOperation::CompleteMultipart {
            upload_id: upload_id.into(),
            key: key.into(),
        })
    }

    pub fn cancel_multipart(upload_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(SignedOperation::CancelMultipart {
            upload_id: upload_id.into(),
            key: key.into(),
        })
    }

    pub fn download(key: impl Into<String>, expires_in: u64) -> Self {
        Self::new(SignedOperation::Download {
            key: key.into(),
            expires_in,
        })
    }
}
