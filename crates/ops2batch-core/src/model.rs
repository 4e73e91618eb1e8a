//! Capability traits the domain model exposes to the batch engine.
//!
//! The engine never owns domain objects. A request keeps a weak
//! back-reference to the model it populates, and the reconciler manipulates
//! models only through these traits. Key-field lookup is an explicit
//! capability on the model rather than a reflective property read.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

/// Shared handle to a domain model instance.
pub type ModelHandle = Arc<Mutex<dyn DataModel>>;

/// Weak back-reference from a request to its bound model.
///
/// Relation plus lookup, never ownership: when the model graph drops an
/// instance, requests pointing at it simply stop resolving.
pub type WeakModelHandle = Weak<Mutex<dyn DataModel>>;

/// Shared handle to a parent collection inside the model graph.
pub type CollectionHandle = Arc<Mutex<dyn ModelCollection>>;

/// Capabilities a domain entity implements to participate in batching.
pub trait DataModel: Send {
    /// Name used to group models of the same logical type during
    /// duplicate-GET reconciliation.
    fn type_name(&self) -> &'static str;

    /// Read the value of a named field, if the model carries one.
    fn field_value(&self, field: &str) -> Option<String>;

    fn has_field(&self, field: &str) -> bool {
        self.field_value(field).is_some()
    }

    /// Absorb the properties and child collections of `other`.
    ///
    /// Implementations downcast `other` through [`DataModel::as_any`]; a
    /// merge across different concrete types is a no-op.
    fn merge_from(&mut self, other: &dyn DataModel);

    /// Clear dirty-state tracking after a successful mutation.
    ///
    /// Models without change tracking keep the default no-op.
    fn commit(&mut self) {}

    fn set_deleted(&mut self);

    fn deleted(&self) -> bool;

    /// Concrete-type access for `merge_from` implementations.
    fn as_any(&self) -> &dyn Any;

    /// Mutable concrete-type access for mapping helpers.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A collection in the model graph that can shed members.
pub trait ModelCollection: Send {
    /// Remove a model by pointer identity (see [`same_model`]). Returns
    /// whether it was present.
    fn remove(&mut self, model: &ModelHandle) -> bool;
}

/// Pointer identity for model handles.
///
/// Compares the underlying allocation and ignores vtable metadata, so two
/// handles produced by different unsizing coercions of the same instance
/// still compare equal.
pub fn same_model(a: &ModelHandle, b: &ModelHandle) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Per-entity metadata a request carries for framing and reconciliation.
#[derive(Clone, Default)]
pub struct EntityInfo {
    /// Key field used when the batch went over the REST family.
    pub rest_key_field: Option<String>,
    /// Key field used when the batch went over the Graph family.
    pub graph_key_field: Option<String>,
    /// The collection holding the bound model, if it lives in one.
    pub parent_collection: Option<CollectionHandle>,
}

impl EntityInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(
        rest_key_field: impl Into<String>,
        graph_key_field: impl Into<String>,
    ) -> Self {
        Self {
            rest_key_field: Some(rest_key_field.into()),
            graph_key_field: Some(graph_key_field.into()),
            parent_collection: None,
        }
    }

    pub fn parented(mut self, collection: CollectionHandle) -> Self {
        self.parent_collection = Some(collection);
        self
    }

    /// The key field for the family the batch actually used.
    pub fn key_field(&self, graph: bool) -> Option<&str> {
        if graph {
            self.graph_key_field.as_deref()
        } else {
            self.rest_key_field.as_deref()
        }
    }
}

impl fmt::Debug for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInfo")
            .field("rest_key_field", &self.rest_key_field)
            .field("graph_key_field", &self.graph_key_field)
            .field("parent_collection", &self.parent_collection.is_some())
            .finish()
    }
}
