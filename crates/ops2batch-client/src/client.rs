//! The batch client facade.
//!
//! Owns the batches map and the collaborator seams, and drives the full
//! execute pipeline: reap, dedup, family resolution, dispatch, mapping,
//! commit, reconciliation.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use ops2batch_config::GraphConfig;
use ops2batch_core::dedup::dedup_get_requests;
use ops2batch_core::{Batch, BatchError, HttpMethod};

use crate::auth::AuthenticationProvider;
use crate::dispatcher::Dispatcher;
use crate::http::Transport;
use crate::mapping::JsonMappingHelper;
use crate::reconcile;

/// Client-side batching engine for one logical session.
///
/// Generic over the two family transports so tests and alternative
/// runtimes can swap the HTTP stack. Not internally synchronized: one
/// caller drives `ensure_batch`/`execute_batch`; the transports, the
/// authentication provider and the mapping helper may be shared across
/// sessions and must be thread-safe themselves.
pub struct BatchClient<R: Transport, G: Transport> {
    rest: R,
    graph: G,
    auth: Arc<dyn AuthenticationProvider>,
    mapper: Arc<dyn JsonMappingHelper>,
    graph_batch_url: String,
    batches: HashMap<Uuid, Batch>,
}

impl<R: Transport, G: Transport> BatchClient<R, G> {
    pub fn new(
        rest: R,
        graph: G,
        auth: Arc<dyn AuthenticationProvider>,
        mapper: Arc<dyn JsonMappingHelper>,
        graph_config: &GraphConfig,
    ) -> Self {
        Self {
            rest,
            graph,
            auth,
            mapper,
            graph_batch_url: graph_config.batch_endpoint(),
            batches: HashMap::new(),
        }
    }

    /// Create a new open batch and hand it out for population.
    pub fn ensure_batch(&mut self) -> &mut Batch {
        let batch = Batch::new();
        let id = batch.id();
        self.batches.entry(id).or_insert(batch)
    }

    /// Look up an existing batch by id, creating it when absent. Lets a
    /// caller join an in-flight batch it learned the id of.
    pub fn ensure_batch_with_id(&mut self, id: Uuid) -> &mut Batch {
        self.batches.entry(id).or_insert_with(|| Batch::with_id(id))
    }

    pub fn contains_batch(&self, id: Uuid) -> bool {
        self.batches.contains_key(&id)
    }

    pub fn batch(&self, id: Uuid) -> Option<&Batch> {
        self.batches.get(&id)
    }

    pub fn batch_mut(&mut self, id: Uuid) -> Option<&mut Batch> {
        self.batches.get_mut(&id)
    }

    /// Execute a batch end to end.
    ///
    /// Executed batches are reaped at the start of the next call, so
    /// executing the same id twice is an idempotent no-op. On failure or
    /// cancellation the batch stays in the map un-executed with any
    /// already-parsed responses still attached; re-executing dispatches
    /// only the requests that do not carry a response yet, so sub-calls
    /// the server already answered are not replayed. No reconciliation
    /// runs on a failed batch.
    #[instrument(skip_all, fields(batch = %id))]
    pub async fn execute_batch(
        &mut self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        self.reap_executed();

        let Some(mut batch) = self.batches.remove(&id) else {
            debug!("execute on unknown or reaped batch; nothing to do");
            return Ok(());
        };

        if batch.is_empty() {
            batch.mark_executed();
            self.batches.insert(id, batch);
            return Ok(());
        }

        let dropped = dedup_get_requests(&mut batch);
        if !dropped.is_empty() {
            debug!(dropped = dropped.len(), "removed duplicate GET requests");
        }

        let dispatcher = Dispatcher {
            rest: &self.rest,
            graph: &self.graph,
            auth: self.auth.as_ref(),
            graph_batch_url: &self.graph_batch_url,
        };

        let outcome = {
            let batch = &mut batch;
            async {
                dispatcher.dispatch(batch, cancel).await?;
                self.map_responses(batch).await?;
                commit_patched(batch);
                reconcile::reconcile(batch);
                batch.mark_executed();
                Ok(())
            }
            .await
        };

        match outcome {
            Ok(()) => {
                info!(requests = batch.len(), "batch executed");
                self.batches.insert(id, batch);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "batch execution failed; batch stays open");
                self.batches.insert(id, batch);
                Err(e)
            }
        }
    }

    /// Hand every non-empty response body to the mapping helper, then run
    /// the request's post-mapping hook.
    async fn map_responses(&self, batch: &Batch) -> Result<(), BatchError> {
        for request in batch.requests() {
            let has_body = request
                .response_json()
                .map(|json| !json.is_empty())
                .unwrap_or(false);
            if !has_body {
                continue;
            }
            self.mapper.map(request).await?;
            if let (Some(hook), Some(json)) =
                (request.post_mapping_json(), request.response_json())
            {
                hook.as_ref()(json);
            }
        }
        Ok(())
    }

    /// Drop every executed batch. Runs at the start of each execute.
    fn reap_executed(&mut self) {
        let before = self.batches.len();
        self.batches.retain(|_, batch| !batch.executed());
        let reaped = before - self.batches.len();
        if reaped > 0 {
            debug!(reaped, "reaped executed batches");
        }
    }
}

/// Commit models behind successfully PATCHed requests, clearing their
/// dirty tracking.
fn commit_patched(batch: &Batch) {
    for request in batch.requests() {
        if request.method() != HttpMethod::Patch {
            continue;
        }
        let succeeded = request
            .response_status()
            .map(|status| (200..300).contains(&status))
            .unwrap_or(false);
        if !succeeded {
            continue;
        }
        if let Some(handle) = request.model() {
            match handle.lock() {
                Ok(mut model) => model.commit(),
                Err(_) => warn!("model mutex poisoned; skipping commit"),
            }
        }
    }
}
