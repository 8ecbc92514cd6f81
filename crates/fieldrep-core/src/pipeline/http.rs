//! [`Transport`] over HTTP using `reqwest`.

use std::time::Duration;

use async_trait::async_trait;

use super::transport::{OutboundRequest, Transport, TransportError, TransportResponse};

/// POSTs every request to a single GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::network)?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.http.post(&self.endpoint);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!(
            request_id = %request.request_id,
            operation = request.operation,
            endpoint = %self.endpoint,
            "sending request"
        );

        let response = builder
            .json(&request.body)
            .send()
            .await
            .map_err(TransportError::network)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::network)?
            .to_vec();

        tracing::debug!(
            request_id = %request.request_id,
            status,
            bytes = body.len(),
            "received response"
        );

        Ok(TransportResponse { status, body })
    }
}
