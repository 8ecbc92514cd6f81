//! A scripted, recording [`Transport`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use fieldrep_core::pipeline::{OutboundRequest, Transport, TransportError, TransportResponse};
use serde_json::{Value, json};

/// Replays queued responses in order and records every request.
///
/// When the queue runs dry, `send` fails with a network error naming the
/// operation, so an unexpected call shows up as a test failure rather than
/// a hang.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response `{ "data": data }`.
    pub fn push_data(&self, data: Value) -> &Self {
        self.push_response(TransportResponse::json(&json!({ "data": data })))
    }

    /// Queue a 200 response carrying a GraphQL error array.
    pub fn push_errors(&self, messages: &[&str]) -> &Self {
        let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
        self.push_response(TransportResponse::json(&json!({ "data": null, "errors": errors })))
    }

    /// Queue a response with an arbitrary status and raw body.
    pub fn push_status(&self, status: u16, body: &str) -> &Self {
        self.push_response(TransportResponse {
            status,
            body: body.as_bytes().to_vec(),
        })
    }

    pub fn push_response(&self, response: TransportResponse) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a transport-level failure.
    pub fn push_network_error(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::network(message.to_string())));
        self
    }

    /// Number of requests that reached the transport.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Operation names in the order they were sent.
    pub fn operations(&self) -> Vec<&'static str> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.operation)
            .collect()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let operation = request.operation;
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::network(format!(
                    "no scripted response left for {operation}"
                )))
            })
    }
}
