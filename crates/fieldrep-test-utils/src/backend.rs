//! An axum GraphQL endpoint answering by operation name.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

/// How the mock answers one operation.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with `{ "data": ... }`.
    Data(Value),
    /// 200 with `{ "data": null, "errors": [...] }`.
    Errors(Vec<String>),
    /// Any status with a plain-text body.
    Status(u16, String),
}

/// One request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: Option<String>,
    /// Lower-case header names.
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn variables(&self) -> &Value {
        &self.body["variables"]
    }
}

#[derive(Clone, Default)]
struct BackendState {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A GraphQL server bound to an ephemeral local port.
///
/// The server task lives as long as the runtime that started it.
pub struct MockBackend {
    state: BackendState,
    addr: SocketAddr,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = BackendState::default();
        let app = Router::new()
            .route("/graphql", post(handle_graphql))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("mock backend has no address");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock backend stopped");
        });

        Self { state, addr }
    }

    /// Full URL of the GraphQL endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}/graphql", self.addr)
    }

    /// Set (or replace) the reply for `operation`.
    pub fn reply(&self, operation: &str, reply: MockReply) -> &Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .insert(operation.to_string(), reply);
        self
    }

    /// Shorthand for [`MockReply::Data`].
    pub fn reply_data(&self, operation: &str, data: Value) -> &Self {
        self.reply(operation, MockReply::Data(data))
    }

    pub fn received(&self) -> Vec<RecordedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_for(&self, operation: &str) -> Vec<RecordedRequest> {
        self.received()
            .into_iter()
            .filter(|r| r.operation.as_deref() == Some(operation))
            .collect()
    }
}

async fn handle_graphql(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let operation = body["query"].as_str().and_then(operation_name);
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    state.received.lock().unwrap().push(RecordedRequest {
        operation: operation.clone(),
        headers,
        body,
    });

    let reply = operation
        .as_deref()
        .and_then(|op| state.replies.lock().unwrap().get(op).cloned());

    match reply {
        Some(MockReply::Data(data)) => Json(json!({ "data": data })).into_response(),
        Some(MockReply::Errors(messages)) => {
            let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
            Json(json!({ "data": null, "errors": errors })).into_response()
        }
        Some(MockReply::Status(status, text)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            text,
        )
            .into_response(),
        None => {
            let message = format!("no mock reply for {}", operation.as_deref().unwrap_or("?"));
            Json(json!({ "data": null, "errors": [{ "message": message }] })).into_response()
        }
    }
}

/// `"mutation Login($email: ...) { ... }"` -> `"Login"`.
fn operation_name(query: &str) -> Option<String> {
    let mut words = query.split_whitespace();
    while let Some(word) = words.next() {
        if word == "query" || word == "mutation" {
            let name = words.next()?;
            let end = name.find(['(', '{']).unwrap_or(name.len());
            let name = &name[..end];
            return (!name.is_empty()).then(|| name.to_string());
        }
    }
    None
}
