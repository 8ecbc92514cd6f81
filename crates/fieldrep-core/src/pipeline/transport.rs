//! The `Transport` trait -- the seam between the request pipeline and the
//! network.
//!
//! [`super::http::HttpTransport`] is the production implementation. Tests
//! substitute a scripted transport that records every request it receives.

use std::collections::BTreeMap;

use async_trait::async_trait;
use uuid::Uuid;

/// A fully built backend request, ready to put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    /// Correlation id, logged on both sides of the round trip.
    pub request_id: Uuid,
    /// GraphQL operation name, for logs.
    pub operation: &'static str,
    /// Lower-case header names to values.
    pub headers: BTreeMap<String, String>,
    /// JSON body: `{ "query": ..., "variables": ... }`.
    pub body: serde_json::Value,
}

impl OutboundRequest {
    /// Look up a header by its lower-case name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The `variables` object of the body.
    pub fn variables(&self) -> &serde_json::Value {
        &self.body["variables"]
    }
}

/// Raw HTTP result: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// A 200 response carrying `body` serialized as JSON.
    pub fn json(body: &serde_json::Value) -> Self {
        Self {
            status: 200,
            body: body.to_string().into_bytes(),
        }
    }

    /// Return `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the GraphQL layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {source}")]
    Network {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl TransportError {
    /// Wrap any error as a network failure.
    pub fn network(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Network {
            source: source.into(),
        }
    }
}

/// Sends one [`OutboundRequest`] and returns the raw response.
///
/// Implementations must not retry: a single failure is surfaced as-is.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError>;
}

// Compile-time assertion: Transport must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Transport) {}
};
