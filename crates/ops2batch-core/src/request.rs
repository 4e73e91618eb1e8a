//! The request model: one queued operation against the backend.

use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::model::{EntityInfo, ModelHandle, WeakModelHandle};

/// HTTP method of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint family an operation is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFamily {
    Rest,
    Graph,
}

/// One concrete endpoint call: target family, URL and optional JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub family: ApiFamily,
    pub url: String,
    /// Pre-serialized JSON body, when the operation carries one.
    pub body: Option<String>,
}

impl ApiCall {
    pub fn rest(url: impl Into<String>) -> Self {
        Self {
            family: ApiFamily::Rest,
            url: url.into(),
            body: None,
        }
    }

    pub fn graph(url: impl Into<String>) -> Self {
        Self {
            family: ApiFamily::Graph,
            url: url.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Transforms the response fragment before the mapping helper consumes it.
pub type JsonCast = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Invoked with the raw response JSON once mapping has completed.
pub type PostMappingHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Everything the caller supplies when appending an operation to a batch.
pub struct Operation {
    pub model: Option<WeakModelHandle>,
    pub entity: EntityInfo,
    pub method: HttpMethod,
    pub primary: ApiCall,
    pub backup: Option<ApiCall>,
    pub from_json_casting: Option<JsonCast>,
    pub post_mapping_json: Option<PostMappingHook>,
}

impl Operation {
    pub fn new(method: HttpMethod, primary: ApiCall) -> Self {
        Self {
            model: None,
            entity: EntityInfo::default(),
            method,
            primary,
            backup: None,
            from_json_casting: None,
            post_mapping_json: None,
        }
    }

    pub fn bound_to(mut self, model: WeakModelHandle) -> Self {
        self.model = Some(model);
        self
    }

    pub fn entity(mut self, entity: EntityInfo) -> Self {
        self.entity = entity;
        self
    }

    pub fn backup(mut self, backup: ApiCall) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn casting(mut self, cast: JsonCast) -> Self {
        self.from_json_casting = Some(cast);
        self
    }

    pub fn post_mapping(mut self, hook: PostMappingHook) -> Self {
        self.post_mapping_json = Some(hook);
        self
    }
}

/// One queued operation inside a batch.
///
/// Immutable after append, except for the response fields which dispatch
/// populates exactly once.
pub struct BatchRequest {
    order: usize,
    method: HttpMethod,
    primary: ApiCall,
    backup: Option<ApiCall>,
    model: Option<WeakModelHandle>,
    entity: EntityInfo,
    from_json_casting: Option<JsonCast>,
    post_mapping_json: Option<PostMappingHook>,
    response_json: Option<String>,
    response_status: Option<u16>,
}

impl BatchRequest {
    pub(crate) fn new(order: usize, op: Operation) -> Self {
        Self {
            order,
            method: op.method,
            primary: op.primary,
            backup: op.backup,
            model: op.model,
            entity: op.entity,
            from_json_casting: op.from_json_casting,
            post_mapping_json: op.post_mapping_json,
            response_json: None,
            response_status: None,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Family of the call this request will go out on.
    pub fn family(&self) -> ApiFamily {
        self.primary.family
    }

    pub fn primary(&self) -> &ApiCall {
        &self.primary
    }

    pub fn backup(&self) -> Option<&ApiCall> {
        self.backup.as_ref()
    }

    /// Resolve the bound model, if it is still alive.
    pub fn model(&self) -> Option<ModelHandle> {
        self.model.as_ref().and_then(Weak::upgrade)
    }

    pub fn entity(&self) -> &EntityInfo {
        &self.entity
    }

    pub fn from_json_casting(&self) -> Option<&JsonCast> {
        self.from_json_casting.as_ref()
    }

    pub fn post_mapping_json(&self) -> Option<&PostMappingHook> {
        self.post_mapping_json.as_ref()
    }

    pub fn response_json(&self) -> Option<&str> {
        self.response_json.as_deref()
    }

    pub fn response_status(&self) -> Option<u16> {
        self.response_status
    }

    /// Bind a sub-response to this request. Populated exactly once.
    pub fn attach_response(&mut self, json: String, status: u16) {
        debug_assert!(
            self.response_status.is_none(),
            "response attached twice to request {}",
            self.order
        );
        self.response_json = Some(json);
        self.response_status = Some(status);
    }

    /// Promote the backup call into the primary slot.
    pub(crate) fn promote_backup(&mut self) {
        if let Some(backup) = self.backup.take() {
            self.primary = backup;
        }
    }
}

impl fmt::Debug for BatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRequest")
            .field("order", &self.order)
            .field("method", &self.method)
            .field("primary", &self.primary)
            .field("backup", &self.backup)
            .field("response_status", &self.response_status)
            .finish()
    }
}
