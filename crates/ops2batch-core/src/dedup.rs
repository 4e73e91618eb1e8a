//! GET deduplication applied to a batch before dispatch.

use std::collections::HashSet;

use crate::batch::Batch;
use crate::request::HttpMethod;

/// Remove later duplicates of identical GET calls, keeping the first
/// occurrence of each. Identity is the primary call's URL plus body text.
/// Non-GET requests are never touched: two identical POSTs are independent
/// creations.
///
/// Returns the orders that were dropped.
pub fn dedup_get_requests(batch: &mut Batch) -> Vec<usize> {
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let mut dropped = Vec::new();
    for request in batch.requests() {
        if request.method() != HttpMethod::Get {
            continue;
        }
        let key = (
            request.primary().url.clone(),
            request.primary().body.clone(),
        );
        if !seen.insert(key) {
            dropped.push(request.order());
        }
    }
    for order in &dropped {
        batch.remove(*order);
    }
    dropped
}
