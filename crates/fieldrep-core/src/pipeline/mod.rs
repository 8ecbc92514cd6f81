//! Session-aware request pipeline.
//!
//! Every backend call goes through [`RequestPipeline::execute_with`]:
//!
//! ```text
//! caller
//!   |  document + variables + RequestOptions
//!   v
//! build_request --no company id--> notify observers, MissingTenantContext
//!   |  headers: content-type, authorization, x-company-id
//!   v
//! Transport::send --non-2xx / bad JSON--> TransportError
//!   |
//!   v
//! decode_response --errors[0]--> Backend { message }
//!   |
//!   v
//! data deserialized into T
//! ```
//!
//! There is no retry anywhere in this path.

pub mod documents;
pub mod http;
pub mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::session::SessionContext;

pub use documents::Document;
pub use http::HttpTransport;
pub use transport::{OutboundRequest, Transport, TransportError, TransportResponse};

/// Header carrying the tenant id.
pub const COMPANY_HEADER: &str = "x-company-id";

/// Longest slice of a non-2xx body kept in the error message.
const MAX_ERROR_BODY: usize = 512;

/// Failures surfaced by [`RequestPipeline`].
#[derive(Debug, Error)]
pub enum RequestError {
    /// The call needed a company id and the session had none. The session
    /// observers have already been notified.
    #[error("company context is missing; sign in again")]
    MissingTenantContext,

    /// The backend answered with a GraphQL error array. Only the first
    /// message is kept.
    #[error("{message}")]
    Backend { message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl RequestError {
    /// Everything except a missing tenant can be retried by the user.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingTenantContext)
    }
}

/// How a single call is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Fail with [`RequestError::MissingTenantContext`] when no company id
    /// is available, and send `x-company-id` when one is.
    pub require_tenant: bool,
    /// Attach `authorization: Bearer <token>` when the session has a token.
    pub authenticated: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            require_tenant: true,
            authenticated: true,
        }
    }
}

impl RequestOptions {
    /// Pre-login calls: no token, no tenant.
    pub fn anonymous() -> Self {
        Self {
            require_tenant: false,
            authenticated: false,
        }
    }

    /// Authenticated but not tenant-scoped.
    pub fn without_tenant() -> Self {
        Self {
            require_tenant: false,
            authenticated: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Wraps every backend call with session headers and uniform error handling.
#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    session: Arc<SessionContext>,
}

impl RequestPipeline {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionContext>) -> Self {
        Self { transport, session }
    }

    /// The session this pipeline reads on every call.
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Execute a tenant-scoped, authenticated call.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        document: &Document,
        variables: serde_json::Value,
    ) -> Result<T, RequestError> {
        self.execute_with(document, variables, RequestOptions::default())
            .await
    }

    /// Execute a call with explicit scoping.
    pub async fn execute_with<T: DeserializeOwned>(
        &self,
        document: &Document,
        variables: serde_json::Value,
        options: RequestOptions,
    ) -> Result<T, RequestError> {
        let request = self.build_request(document, variables, options)?;
        let request_id = request.request_id;

        let result = match self.transport.send(request).await {
            Ok(response) => decode_response(document, response),
            Err(e) => Err(RequestError::Transport(e)),
        };

        if let Err(ref e) = result {
            tracing::warn!(
                request_id = %request_id,
                operation = document.operation,
                error = %e,
                "backend call failed"
            );
        }
        result
    }

    /// Build the outbound request, or fail before touching the network.
    ///
    /// When the tenant is required but absent, session observers are
    /// notified synchronously before the error is returned.
    pub fn build_request(
        &self,
        document: &Document,
        variables: serde_json::Value,
        options: RequestOptions,
    ) -> Result<OutboundRequest, RequestError> {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        if options.authenticated {
            if let Some(token) = self.session.token() {
                headers.insert("authorization".to_string(), format!("Bearer {token}"));
            }
        }

        if options.require_tenant {
            match self.session.company_id() {
                Some(company_id) => {
                    headers.insert(COMPANY_HEADER.to_string(), company_id);
                }
                None => {
                    self.session.notify_session_invalid();
                    return Err(RequestError::MissingTenantContext);
                }
            }
        }

        let variables = if variables.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            variables
        };

        Ok(OutboundRequest {
            request_id: Uuid::new_v4(),
            operation: document.operation,
            headers,
            body: serde_json::json!({
                "query": document.text,
                "variables": variables,
            }),
        })
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Turn a raw response into `T`, applying the GraphQL error policy.
fn decode_response<T: DeserializeOwned>(
    document: &Document,
    response: TransportResponse,
) -> Result<T, RequestError> {
    if !response.is_success() {
        let mut body = String::from_utf8_lossy(&response.body).into_owned();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(TransportError::Status {
            status: response.status,
            body,
        }
        .into());
    }

    let envelope: GraphQlResponse = serde_json::from_slice(&response.body)
        .map_err(|e| TransportError::Decode(format!("response body: {e}")))?;

    let mut errors = envelope.errors.unwrap_or_default();
    if !errors.is_empty() {
        if errors.len() > 1 {
            tracing::debug!(
                operation = document.operation,
                dropped = errors.len() - 1,
                "keeping only the first GraphQL error"
            );
        }
        let first = errors.swap_remove(0);
        return Err(RequestError::Backend {
            message: first.message,
        });
    }

    let data = envelope
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| TransportError::Decode("response carried neither data nor errors".into()))?;

    serde_json::from_value(data).map_err(|e| {
        TransportError::Decode(format!("{} data: {e}", document.operation)).into()
    })
}
