//! Binding Store Port
//!
//! Durable mapping between logical platform ids and backend object ids,
//! scoped by backend instance. One store, two lookup paths.

use crate::domain::entities::Binding;
use crate::domain::error::Result;
use crate::domain::value_objects::ObjectKind;
use async_trait::async_trait;

/// Store of logical-id to backend-id bindings.
///
/// Implementations keep the forward index (kind, logical_id, instance) and
/// the reverse index (kind, instance, backend_id) consistent with each other.
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// Create or replace the binding for (kind, logical_id, instance_id).
    async fn put(&self, binding: Binding) -> Result<()>;

    /// Look up by logical id. Fails with `BindingNotFound` when absent.
    async fn get(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<Binding>;

    /// Reverse lookup by backend id. Fails with `BindingNotFound` when absent.
    async fn get_by_backend_id(
        &self,
        kind: ObjectKind,
        instance_id: &str,
        backend_id: &str,
    ) -> Result<Binding>;

    /// Remove a binding. Removing an absent binding is not an error.
    async fn delete(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<()>;
}
