//! In-Memory Binding Store
//!
//! Implements BindingStore as two indexes over one record set, guarded by
//! a single lock so the forward and reverse paths never disagree.

use crate::domain::entities::Binding;
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::BindingStore;
use crate::domain::value_objects::ObjectKind;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

type ForwardKey = (ObjectKind, String, String);
type ReverseKey = (ObjectKind, String, String);

#[derive(Default)]
struct Indexes {
    /// (kind, logical_id, instance_id) -> binding
    by_logical: HashMap<ForwardKey, Binding>,
    /// (kind, instance_id, backend_id) -> logical_id
    by_backend: HashMap<ReverseKey, String>,
}

/// Binding store kept in process memory.
///
/// Suitable for tests and single-process deployments that can afford to
/// lose bindings on restart.
pub struct MemoryBindingStore {
    inner: RwLock<Indexes>,
}

impl MemoryBindingStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Indexes::default()),
        }
    }

    /// Number of stored bindings.
    pub fn len(&self) -> usize {
        self.inner.read().by_logical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBindingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BindingStore for MemoryBindingStore {
    async fn put(&self, binding: Binding) -> Result<()> {
        let mut guard = self.inner.write();
        let forward = (
            binding.kind,
            binding.logical_id.clone(),
            binding.instance_id.clone(),
        );

        // A replaced binding must not leave its old reverse entry behind.
        if let Some(old) = guard.by_logical.remove(&forward) {
            guard
                .by_backend
                .remove(&(old.kind, old.instance_id, old.backend_id));
        }

        // A backend id taken over from another logical id evicts that binding,
        // as the unique index does in the SQLite store.
        let reverse = (
            binding.kind,
            binding.instance_id.clone(),
            binding.backend_id.clone(),
        );
        if let Some(previous) = guard.by_backend.insert(reverse, binding.logical_id.clone()) {
            if previous != binding.logical_id {
                tracing::warn!(
                    "{} backend id {} on {} moved from {} to {}",
                    binding.kind,
                    binding.backend_id,
                    binding.instance_id,
                    previous,
                    binding.logical_id
                );
                guard
                    .by_logical
                    .remove(&(binding.kind, previous, binding.instance_id.clone()));
            }
        }
        guard.by_logical.insert(forward, binding);
        Ok(())
    }

    async fn get(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<Binding> {
        self.inner
            .read()
            .by_logical
            .get(&(kind, logical_id.to_string(), instance_id.to_string()))
            .cloned()
            .ok_or_else(|| DriverError::BindingNotFound {
                kind,
                id: logical_id.to_string(),
                instance: instance_id.to_string(),
            })
    }

    async fn get_by_backend_id(
        &self,
        kind: ObjectKind,
        instance_id: &str,
        backend_id: &str,
    ) -> Result<Binding> {
        let guard = self.inner.read();
        guard
            .by_backend
            .get(&(kind, instance_id.to_string(), backend_id.to_string()))
            .and_then(|logical_id| {
                guard
                    .by_logical
                    .get(&(kind, logical_id.clone(), instance_id.to_string()))
            })
            .cloned()
            .ok_or_else(|| DriverError::BindingNotFound {
                kind,
                id: backend_id.to_string(),
                instance: instance_id.to_string(),
            })
    }

    async fn delete(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<()> {
        let mut guard = self.inner.write();
        if let Some(old) = guard
            .by_logical
            .remove(&(kind, logical_id.to_string(), instance_id.to_string()))
        {
            let reverse = (old.kind, old.instance_id, old.backend_id);
            if guard.by_backend.get(&reverse) == Some(&old.logical_id) {
                guard.by_backend.remove(&reverse);
            }
        }
        Ok(())
    }
}
