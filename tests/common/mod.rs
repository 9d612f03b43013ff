//! Shared fixtures: a transport that records requests and replays canned responses

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use hyper::{Method, StatusCode};
use objstore::transport::{HttpRequest, HttpResponse, RequestBody, Transport, TransportError};
use objstore::{ClientConfig, StorageClient};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub const ACCESS_KEY: &str = "test-access";
pub const SECRET_KEY: &str = "test-secret";

/// A request as it reached the transport, body collected
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    /// Length the body declared before it was collected
    pub declared_length: Option<u64>,
    pub streamed: bool,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Path and query, without the base URL
    pub fn path_and_query(&self) -> &str {
        let after_scheme = self.url.split_once("://").map_or(self.url.as_str(), |(_, rest)| rest);
        after_scheme.find('/').map_or("/", |pos| &after_scheme[pos..])
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

enum Reply {
    Response(HttpResponse),
    Fail(String),
}

/// Records every request; answers from a queue, `200 {}` when the queue is empty
#[derive(Clone, Default)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Response(HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from(body.to_string()),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let declared_length = request.body.len();
        let (body, streamed) = match request.body {
            RequestBody::Empty => (Bytes::new(), false),
            RequestBody::Bytes(bytes) => (bytes, false),
            RequestBody::Stream { stream, .. } => {
                let chunks: Vec<Bytes> = stream
                    .try_collect()
                    .await
                    .map_err(|e| TransportError::Connection(e.to_string()))?;
                (Bytes::from(chunks.concat()), true)
            }
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body,
            declared_length,
            streamed,
        });

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError::Connection(message)),
            None => Ok(HttpResponse {
                status: StatusCode::OK,
                body: Bytes::from_static(b"{}"),
            }),
        }
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::new(ACCESS_KEY, SECRET_KEY)
        .unwrap()
        .with_region("us-east-1")
        .with_default_bucket("default-bucket")
}

pub fn client() -> (StorageClient, RecordingTransport) {
    let transport = RecordingTransport::new();
    let client = StorageClient::with_transport(config(), transport.clone());
    (client, transport)
}

/// Split a URL query into ordered pairs, values left encoded
pub fn query_pairs(url: &str) -> Vec<(String, String)> {
    url.split_once('?')
        .map(|(_, query)| {
            query
                .split('&')
                .map(|pair| match pair.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (pair.to_string(), String::new()),
                })
                .collect()
        })
        .unwrap_or_default()
}
