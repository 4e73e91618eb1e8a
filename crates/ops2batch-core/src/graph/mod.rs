//! Graph family framing: JSON envelope serialization and response
//! demultiplexing.

mod framing;
mod parse;

pub use framing::{frame_envelopes, MAX_GRAPH_BATCH_SIZE};
pub use parse::apply_response;
