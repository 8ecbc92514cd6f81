//! Shared test utilities for fieldrep tests.
//!
//! - [`ScriptedTransport`]: an in-process [`Transport`] that replays queued
//!   responses and records every request, for pipeline-level tests.
//! - [`MockBackend`]: a real HTTP GraphQL endpoint on `127.0.0.1:0`,
//!   answering per operation name, for tests that go through
//!   `HttpTransport` or the `fieldrep` binary.
//! - [`fixtures`]: reference data and the backend's `data` payloads for it.
//!
//! Only use this crate from integration tests (`tests/`): it links its own
//! copy of `fieldrep-core`.
//!
//! [`Transport`]: fieldrep_core::pipeline::Transport

pub mod backend;
pub mod fixtures;
pub mod transport;

pub use backend::{MockBackend, MockReply, RecordedRequest};
pub use transport::ScriptedTransport;
