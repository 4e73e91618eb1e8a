// ops2batch-client - The dispatch edge of the batching engine
//
// Owns the collaborator seams (transports, authentication, JSON-to-model
// mapping), drives framed payloads over HTTP and reconciles returned data
// with the in-memory model graph. The pure framing/parsing logic lives in
// ops2batch-core.

mod auth;
mod client;
mod dispatcher;
mod http;
mod http_native;
mod init;
mod mapping;
mod reconcile;

pub use auth::{AuthenticationProvider, StaticTokenProvider};
pub use client::BatchClient;
pub use http::{BatchHttpRequest, HttpResponse, Transport};
pub use http_native::NativeTransport;
pub use init::init_tracing;
pub use mapping::JsonMappingHelper;

pub use ops2batch_core::{
    same_model, ApiCall, ApiFamily, Batch, BatchError, BatchRequest, CollectionHandle, DataModel,
    EntityInfo, HttpMethod, ModelCollection, ModelHandle, Operation, WeakModelHandle,
};
