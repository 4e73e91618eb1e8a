//! The batch container: an ordered set of queued operations with stable
//! identity.
//!
//! Requests are keyed by their insertion `order` in an `IndexMap`, so
//! iteration always follows insertion order even after deduplication
//! punches holes into the order sequence.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{BatchError, Result};
use crate::request::{ApiCall, ApiFamily, BatchRequest, Operation};

pub struct Batch {
    id: Uuid,
    requests: IndexMap<usize, BatchRequest>,
    next_order: usize,
    executed: bool,
}

impl Batch {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            requests: IndexMap::new(),
            next_order: 0,
            executed: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Whether this batch has gone out over the wire. Executed batches are
    /// reaped by the client on the next execute and never re-dispatched.
    pub fn executed(&self) -> bool {
        self.executed
    }

    pub fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Append an operation, assigning the next order. Appending is only
    /// legal while the batch is open.
    pub fn add(&mut self, op: Operation) -> Result<usize> {
        if self.executed {
            return Err(BatchError::precondition(format!(
                "batch {} already executed; create a new batch instead",
                self.id
            )));
        }
        let order = self.next_order;
        self.next_order += 1;
        self.requests.insert(order, BatchRequest::new(order, op));
        Ok(order)
    }

    pub fn request(&self, order: usize) -> Option<&BatchRequest> {
        self.requests.get(&order)
    }

    pub fn request_mut(&mut self, order: usize) -> Option<&mut BatchRequest> {
        self.requests.get_mut(&order)
    }

    /// Requests in insertion order.
    pub fn requests(&self) -> impl Iterator<Item = &BatchRequest> {
        self.requests.values()
    }

    pub fn requests_mut(&mut self) -> impl Iterator<Item = &mut BatchRequest> {
        self.requests.values_mut()
    }

    /// Remove a request by order, preserving the order of the remainder.
    pub fn remove(&mut self, order: usize) -> Option<BatchRequest> {
        self.requests.shift_remove(&order)
    }

    /// Move all requests out, keeping their order keys. Used by the
    /// family splitter.
    pub(crate) fn drain_requests(&mut self) -> IndexMap<usize, BatchRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Re-insert a request under its original order key.
    pub(crate) fn adopt(&mut self, order: usize, request: BatchRequest) {
        self.requests.insert(order, request);
        self.next_order = self.next_order.max(order + 1);
    }

    /// Restore ascending-order iteration after requests were adopted from
    /// sibling batches.
    pub(crate) fn sort_by_order(&mut self) {
        self.requests.sort_keys();
    }

    /// True when every request targets the Graph family.
    pub fn use_graph_batch(&self) -> bool {
        self.requests
            .values()
            .all(|r| r.family() == ApiFamily::Graph)
    }

    /// True when both families are present.
    pub fn has_mixed_api_types(&self) -> bool {
        let mut rest = false;
        let mut graph = false;
        for request in self.requests.values() {
            match request.family() {
                ApiFamily::Rest => rest = true,
                ApiFamily::Graph => graph = true,
            }
        }
        rest && graph
    }

    /// True when every Graph request carries a REST backup call, so the
    /// whole batch can be rewritten to the REST family.
    pub fn can_fall_back_to_rest(&self) -> bool {
        self.requests
            .values()
            .filter(|r| r.family() == ApiFamily::Graph)
            .all(|r| matches!(r.backup(), Some(ApiCall { family: ApiFamily::Rest, .. })))
    }

    /// Promote every Graph request's REST backup into the primary slot,
    /// re-tagging the batch as REST-only.
    ///
    /// Callers must have checked [`Batch::can_fall_back_to_rest`]; a Graph
    /// request without a REST backup is a precondition violation and the
    /// batch is left untouched.
    pub fn make_rest_only(&mut self) -> Result<()> {
        if !self.can_fall_back_to_rest() {
            return Err(BatchError::precondition(format!(
                "batch {} contains Graph requests without a REST backup call",
                self.id
            )));
        }
        for request in self.requests.values_mut() {
            if request.family() == ApiFamily::Graph {
                request.promote_backup();
            }
        }
        Ok(())
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}
