//! Drives framed payloads over HTTP.
//!
//! One dispatch covers the whole batch: family resolution, per-site REST
//! sub-batches, Graph chunks, and the REST-before-Graph split. Sub-batches
//! run sequentially; the server-side cost dominates any client-side
//! parallelism gain and sequential dispatch keeps error reporting
//! deterministic.

use std::collections::HashSet;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use ops2batch_core::plan::{self, DispatchRoute};
use ops2batch_core::{graph, rest, Batch, BatchError, BatchRequest};

use crate::auth::AuthenticationProvider;
use crate::http::{BatchHttpRequest, HttpResponse, Transport};

pub(crate) struct Dispatcher<'a> {
    pub rest: &'a dyn Transport,
    pub graph: &'a dyn Transport,
    pub auth: &'a dyn AuthenticationProvider,
    pub graph_batch_url: &'a str,
}

impl Dispatcher<'_> {
    pub async fn dispatch(
        &self,
        batch: &mut Batch,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        match plan::resolve_route(batch) {
            DispatchRoute::Graph => self.dispatch_graph(batch, cancel).await,
            DispatchRoute::Rest => self.dispatch_rest(batch, cancel).await,
            DispatchRoute::RestFallback => {
                debug!(batch = %batch.id(), "mixed batch with full backup coverage; rewriting to REST only");
                batch.make_rest_only()?;
                self.dispatch_rest(batch, cancel).await
            }
            DispatchRoute::Split => {
                debug!(batch = %batch.id(), "mixed batch without fall-back; splitting into sibling batches");
                let (mut rest_sibling, mut graph_sibling) = plan::split_by_family(batch);
                let result = self
                    .dispatch_split(&mut rest_sibling, &mut graph_sibling, cancel)
                    .await;
                // Requests return to the owning batch even when dispatch
                // failed part-way, so attached responses survive.
                plan::absorb(batch, &mut rest_sibling);
                plan::absorb(batch, &mut graph_sibling);
                result
            }
        }
    }

    async fn dispatch_split(
        &self,
        rest_sibling: &mut Batch,
        graph_sibling: &mut Batch,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        self.dispatch_rest(rest_sibling, cancel).await?;
        self.dispatch_graph(graph_sibling, cancel).await
    }

    /// One HTTP call per site group, ascending order within each group.
    ///
    /// Requests that already carry a response are never re-framed, so
    /// retrying a batch that failed part-way does not replay the calls
    /// that succeeded.
    async fn dispatch_rest(
        &self,
        batch: &mut Batch,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        let groups = rest::partition_by_site(batch)?;
        debug!(batch = %batch.id(), sites = groups.len(), "dispatching REST batch");

        for group in groups {
            let pending: Vec<usize> = group
                .orders
                .iter()
                .copied()
                .filter(|order| {
                    batch
                        .request(*order)
                        .is_some_and(|r| r.response_status().is_none())
                })
                .collect();
            if pending.is_empty() {
                debug!(site = %group.site, "site group already answered; skipping");
                continue;
            }

            let payload = {
                let members: Vec<&BatchRequest> = pending
                    .iter()
                    .filter_map(|order| batch.request(*order))
                    .collect();
                rest::frame_multipart(batch.id(), &members)
            };

            let url = format!("{}/_api/$batch", group.site);
            let mut request = BatchHttpRequest::post(url, payload.content_type, payload.body);
            let response = self.send_checked(self.rest, &mut request, cancel).await?;

            let order_set: HashSet<usize> = pending.iter().copied().collect();
            let mut members: Vec<&mut BatchRequest> = batch
                .requests_mut()
                .filter(|r| order_set.contains(&r.order()))
                .collect();
            rest::apply_response(&response.body, &mut members)?;
            debug!(site = %group.site, parts = order_set.len(), "REST sub-batch completed");
        }

        Ok(())
    }

    /// One HTTP call per Graph chunk. As with REST, already-answered
    /// requests are excluded before chunking.
    async fn dispatch_graph(
        &self,
        batch: &mut Batch,
        cancel: &CancellationToken,
    ) -> Result<(), BatchError> {
        let payloads = {
            let members: Vec<&BatchRequest> = batch
                .requests()
                .filter(|r| r.response_status().is_none())
                .collect();
            if members.is_empty() {
                return Ok(());
            }
            graph::frame_envelopes(&members)?
        };
        debug!(batch = %batch.id(), calls = payloads.len(), "dispatching Graph batch");

        for payload in payloads {
            let mut request =
                BatchHttpRequest::post(self.graph_batch_url, "application/json", payload);
            let response = self.send_checked(self.graph, &mut request, cancel).await?;
            graph::apply_response(&response.body, batch)?;
        }

        Ok(())
    }

    /// Authenticate, send, and fail the batch on a non-2xx envelope.
    async fn send_checked(
        &self,
        transport: &dyn Transport,
        request: &mut BatchHttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, BatchError> {
        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }
        let target = request.url.clone();
        self.auth.authenticate(&target, request, cancel).await?;
        let response = transport.send(request, cancel).await?;
        if !response.is_success() {
            return Err(BatchError::transport(
                target,
                response.status,
                response.body,
            ));
        }
        Ok(response)
    }
}
