//! Per-site partitioning of REST requests.
//!
//! A REST batch call may only address a single site root, so a batch is
//! grouped by the URL prefix before the first `/_api/` and each group goes
//! out as its own HTTP call.

use indexmap::IndexMap;

use crate::batch::Batch;
use crate::error::{BatchError, Result};

/// Separator between the site root and the API path in REST URLs.
pub const API_INFIX: &str = "/_api/";

/// The site root of a REST request URL: text before the first `/_api/`.
pub fn site_of(url: &str) -> Option<&str> {
    url.find(API_INFIX).map(|idx| &url[..idx])
}

/// One per-site sub-batch: the site root and the member orders, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteGroup {
    pub site: String,
    pub orders: Vec<usize>,
}

/// Group a REST batch by site, preserving ascending order within each
/// group and first-seen site order across groups.
pub fn partition_by_site(batch: &Batch) -> Result<Vec<SiteGroup>> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for request in batch.requests() {
        let url = &request.primary().url;
        let site = site_of(url).ok_or_else(|| {
            BatchError::precondition(format!("REST request URL '{url}' does not contain {API_INFIX}"))
        })?;
        groups
            .entry(site.to_string())
            .or_default()
            .push(request.order());
    }
    Ok(groups
        .into_iter()
        .map(|(site, orders)| SiteGroup { site, orders })
        .collect())
}
