//! Family resolution: how a batch reaches the wire.
//!
//! Staying within one family avoids a second framing pass and a second
//! authentication round-trip, so the resolver prefers wholesale fall-back
//! to REST over splitting into sibling batches.

use crate::batch::Batch;
use crate::request::ApiFamily;

/// Outcome of the per-execute family decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchRoute {
    /// Single-family batch, Graph framer.
    Graph,
    /// Single-family batch, REST framer.
    Rest,
    /// Mixed batch where every Graph request has a REST backup: rewrite to
    /// REST-only, then dispatch via the REST framer.
    RestFallback,
    /// Mixed batch without full backup coverage: split into two sibling
    /// batches, REST dispatched before Graph.
    Split,
}

pub fn resolve_route(batch: &Batch) -> DispatchRoute {
    if !batch.has_mixed_api_types() {
        if batch.use_graph_batch() {
            DispatchRoute::Graph
        } else {
            DispatchRoute::Rest
        }
    } else if batch.can_fall_back_to_rest() {
        DispatchRoute::RestFallback
    } else {
        DispatchRoute::Split
    }
}

/// Split a mixed batch into REST and Graph siblings with fresh identities,
/// preserving each request's original order key.
pub fn split_by_family(batch: &mut Batch) -> (Batch, Batch) {
    let mut rest = Batch::new();
    let mut graph = Batch::new();
    for (order, request) in batch.drain_requests() {
        match request.family() {
            ApiFamily::Rest => rest.adopt(order, request),
            ApiFamily::Graph => graph.adopt(order, request),
        }
    }
    (rest, graph)
}

/// Return a dispatched sibling's requests to the owning batch.
pub fn absorb(batch: &mut Batch, sibling: &mut Batch) {
    for (order, request) in sibling.drain_requests() {
        batch.adopt(order, request);
    }
    batch.sort_by_order();
}
