//! Post-execution reconciliation of the model graph.
//!
//! Runs only after every sub-request succeeded. Merging happens before
//! delete propagation.

use std::collections::HashMap;
use std::sync::MutexGuard;

use tracing::{debug, warn};

use ops2batch_core::{same_model, Batch, DataModel, HttpMethod, ModelHandle};

/// Merge duplicate GET results, then propagate deletes.
pub(crate) fn reconcile(batch: &Batch) {
    merge_duplicate_gets(batch);
    propagate_deletes(batch);
}

/// When one batch accidentally materialized two instances of the same
/// logical entity, the lowest-order instance becomes canonical: the others
/// are merged into it, removed from their parent collection and flagged
/// deleted.
fn merge_duplicate_gets(batch: &Batch) {
    let graph_keys = batch.use_graph_batch();

    // (model type, key-field value) -> member orders
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for request in batch.requests() {
        if request.method() != HttpMethod::Get {
            continue;
        }
        let Some(handle) = request.model() else {
            continue;
        };
        let Some(key_field) = request.entity().key_field(graph_keys) else {
            continue;
        };
        let Some(guard) = lock_model(&handle) else {
            continue;
        };
        let Some(key_value) = guard.field_value(key_field) else {
            continue;
        };
        let type_name = guard.type_name().to_string();
        drop(guard);
        groups
            .entry((type_name, key_value))
            .or_default()
            .push(request.order());
    }

    for ((type_name, _), mut orders) in groups {
        if orders.len() < 2 {
            continue;
        }
        orders.sort_unstable();
        let canonical_order = orders[0];
        let Some(canonical) = batch.request(canonical_order).and_then(|r| r.model()) else {
            continue;
        };

        for order in &orders[1..] {
            let Some(request) = batch.request(*order) else {
                continue;
            };
            let Some(duplicate) = request.model() else {
                continue;
            };
            if same_model(&canonical, &duplicate) {
                // Same instance bound twice; nothing to merge.
                continue;
            }

            {
                let (Some(mut canonical_guard), Some(mut duplicate_guard)) =
                    (lock_model(&canonical), lock_model(&duplicate))
                else {
                    continue;
                };
                canonical_guard.merge_from(&*duplicate_guard);
                duplicate_guard.set_deleted();
            }
            if let Some(collection) = &request.entity().parent_collection {
                match collection.lock() {
                    Ok(mut collection) => {
                        collection.remove(&duplicate);
                    }
                    Err(_) => warn!("parent collection mutex poisoned; skipping removal"),
                }
            }
            debug!(
                model = type_name.as_str(),
                canonical = canonical_order,
                duplicate = *order,
                "merged duplicate GET result"
            );
        }
    }
}

fn propagate_deletes(batch: &Batch) {
    for request in batch.requests() {
        if request.method() != HttpMethod::Delete {
            continue;
        }
        let Some(handle) = request.model() else {
            continue;
        };
        if let Some(mut guard) = lock_model(&handle) {
            guard.set_deleted();
        }
        if let Some(collection) = &request.entity().parent_collection {
            match collection.lock() {
                Ok(mut collection) => {
                    collection.remove(&handle);
                }
                Err(_) => warn!("parent collection mutex poisoned; skipping removal"),
            }
        }
    }
}

fn lock_model(handle: &ModelHandle) -> Option<MutexGuard<'_, dyn DataModel + 'static>> {
    match handle.lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            warn!("model mutex poisoned; skipping reconciliation step");
            None
        }
    }
}
