//! Client core for pharmaceutical field representatives.
//!
//! Layers, bottom up:
//! - [`session`]: token and company id, plus session-invalid observers.
//! - [`pipeline`]: every GraphQL call, with auth and tenant headers and
//!   one error policy.
//! - [`api`]: typed operations on top of the pipeline.
//! - [`cache`]: TTL-bound reference data over a `fieldrep_store` store.
//! - [`wizard`], [`search`], [`catalog`], [`sale`]: the flows a
//!   representative drives.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod pipeline;
pub mod sale;
pub mod search;
pub mod session;
pub mod wizard;

pub use api::{FieldRepApi, PeopleLists};
pub use cache::ReferenceDataCache;
pub use pipeline::{RequestError, RequestOptions, RequestPipeline};
pub use session::{Session, SessionContext};
