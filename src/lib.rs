//! objstore - client SDK for the objstore file API
//!
//! Signed uploads, deletes, cache purges, multipart uploads, bucket listings
//! and pre-signed URLs over a pluggable HTTP transport.

pub mod api;
pub mod config;
pub mod transport;

pub use api::{StorageClient, StorageError};
pub use config::ClientConfig;
pub use transport::{HyperTransport, Payload, Transport};
