// ops2batch-core - Pure batching logic
//
// This crate contains the PURE logic for turning queued data-model
// operations into batched wire payloads and binding the demultiplexed
// responses back. No I/O, no async, no runtime dependencies.
//
// The edges (HTTP transports, authentication, JSON-to-model mapping,
// reconciliation) live in ops2batch-client.

pub mod batch;
pub mod dedup;
pub mod error;
pub mod graph;
pub mod model;
pub mod plan;
pub mod request;
pub mod rest;

pub use batch::Batch;
pub use error::BatchError;
pub use model::{
    same_model, CollectionHandle, DataModel, EntityInfo, ModelCollection, ModelHandle,
    WeakModelHandle,
};
pub use plan::DispatchRoute;
pub use request::{ApiCall, ApiFamily, BatchRequest, HttpMethod, Operation};
