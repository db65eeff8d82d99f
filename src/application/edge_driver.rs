//! Edge Load Balancer Driver
//!
//! Reconciles platform VIPs, pools and health monitors onto an edge
//! appliance. Each create persists a binding only after every backend call
//! of the sequence succeeded; each delete removes the binding only after
//! every backend delete succeeded. Nothing is rolled back: a failure is
//! logged where it happens and returned unchanged.

use crate::domain::entities::{Binding, HealthMonitor, Member, Pool, Vip};
use crate::domain::error::Result;
use crate::domain::ports::{BindingStore, EdgeGateway};
use crate::domain::services::{MonitorSnapshot, PoolSnapshot, Translator, VipSnapshot};
use crate::domain::value_objects::{object_id_from_location, ObjectKind};
use std::sync::Arc;

pub struct EdgeLoadBalancerDriver {
    gateway: Arc<dyn EdgeGateway>,
    bindings: Arc<dyn BindingStore>,
    translator: Translator,
}

impl EdgeLoadBalancerDriver {
    pub fn new(gateway: Arc<dyn EdgeGateway>, bindings: Arc<dyn BindingStore>) -> Self {
        let translator = Translator::new(bindings.clone());
        Self {
            gateway,
            bindings,
            translator,
        }
    }

    async fn binding(&self, kind: ObjectKind, logical_id: &str, edge_id: &str) -> Result<Binding> {
        self.bindings
            .get(kind, logical_id, edge_id)
            .await
            .inspect_err(|e| tracing::error!("{}", e))
    }

    // =========================================================================
    // VIP
    // =========================================================================

    /// Create the app profile, then the virtual server referencing it, then
    /// record the binding. A failed virtual server leaves the profile behind.
    pub async fn create_vip(&self, edge_id: &str, vip: &Vip) -> Result<Binding> {
        let profile = Translator::to_app_profile(&vip.name, vip.session_persistence.as_ref());
        let created = self
            .gateway
            .create_app_profile(edge_id, &profile)
            .await
            .inspect_err(|e| {
                tracing::error!("failed to create app profile on edge {}: {}", edge_id, e)
            })?;
        let app_profile_id = object_id_from_location(&created.location).to_string();

        let edge_vip = self
            .translator
            .to_backend_vip(edge_id, vip, Some(app_profile_id.as_str()))
            .await?;
        let created = self
            .gateway
            .create_vip(edge_id, &edge_vip)
            .await
            .inspect_err(|e| tracing::error!("failed to create vip on edge {}: {}", edge_id, e))?;
        let vip_backend_id = object_id_from_location(&created.location);

        let binding = Binding::new(ObjectKind::Vip, &vip.id, edge_id, vip_backend_id)
            .with_extra(app_profile_id);
        self.bindings.put(binding.clone()).await?;

        tracing::info!("vip {} created on edge {} as {}", vip.id, edge_id, binding.backend_id);
        Ok(binding)
    }

    pub async fn get_vip(&self, edge_id: &str, vip_id: &str) -> Result<VipSnapshot> {
        let binding = self.binding(ObjectKind::Vip, vip_id, edge_id).await?;
        let edge_vip = self
            .gateway
            .get_vip(edge_id, &binding.backend_id)
            .await
            .inspect_err(|e| tracing::error!("failed to get vip on edge {}: {}", edge_id, e))?;

        self.translator.from_backend_vip(edge_id, &edge_vip).await
    }

    /// Push the VIP's current fields, keeping its backend id and app profile.
    pub async fn update_vip(&self, edge_id: &str, vip: &Vip) -> Result<()> {
        let binding = self.binding(ObjectKind::Vip, &vip.id, edge_id).await?;
        let edge_vip = self
            .translator
            .to_backend_vip(edge_id, vip, binding.extra.as_deref())
            .await?;

        self.gateway
            .update_vip(edge_id, &binding.backend_id, &edge_vip)
            .await
            .inspect_err(|e| tracing::error!("failed to update vip on edge {}: {}", edge_id, e))
    }

    /// Delete the virtual server and its app profile. The binding stays
    /// when either call fails so the delete can be retried.
    pub async fn delete_vip(&self, edge_id: &str, vip_id: &str) -> Result<()> {
        let binding = self.binding(ObjectKind::Vip, vip_id, edge_id).await?;

        self.gateway
            .delete_vip(edge_id, &binding.backend_id)
            .await
            .inspect_err(|e| tracing::error!("failed to delete vip on edge {}: {}", edge_id, e))?;

        if let Some(app_profile_id) = &binding.extra {
            self.gateway
                .delete_app_profile(edge_id, app_profile_id)
                .await
                .inspect_err(|e| {
                    tracing::error!("failed to delete app profile on edge {}: {}", edge_id, e)
                })?;
        }

        self.bindings.delete(ObjectKind::Vip, vip_id, edge_id).await
    }

    // =========================================================================
    // Pool
    // =========================================================================

    pub async fn create_pool(&self, edge_id: &str, pool: &Pool, members: &[Member]) -> Result<Binding> {
        let edge_pool = self.translator.to_backend_pool(edge_id, pool, members).await?;
        let created = self
            .gateway
            .create_pool(edge_id, &edge_pool)
            .await
            .inspect_err(|e| tracing::error!("failed to create pool on edge {}: {}", edge_id, e))?;

        let binding = Binding::new(
            ObjectKind::Pool,
            &pool.id,
            edge_id,
            object_id_from_location(&created.location),
        );
        self.bindings.put(binding.clone()).await?;

        tracing::info!("pool {} created on edge {} as {}", pool.id, edge_id, binding.backend_id);
        Ok(binding)
    }

    pub async fn get_pool(&self, edge_id: &str, pool_id: &str) -> Result<PoolSnapshot> {
        let binding = self.binding(ObjectKind::Pool, pool_id, edge_id).await?;
        let edge_pool = self
            .gateway
            .get_pool(edge_id, &binding.backend_id)
            .await
            .inspect_err(|e| tracing::error!("failed to get pool on edge {}: {}", edge_id, e))?;

        Ok(Translator::from_backend_pool(&edge_pool))
    }

    pub async fn update_pool(&self, edge_id: &str, pool: &Pool, members: &[Member]) -> Result<()> {
        let binding = self.binding(ObjectKind::Pool, &pool.id, edge_id).await?;
        let edge_pool = self.translator.to_backend_pool(edge_id, pool, members).await?;

        self.gateway
            .update_pool(edge_id, &binding.backend_id, &edge_pool)
            .await
            .inspect_err(|e| tracing::error!("failed to update pool on edge {}: {}", edge_id, e))
    }

    pub async fn delete_pool(&self, edge_id: &str, pool_id: &str) -> Result<()> {
        let binding = self.binding(ObjectKind::Pool, pool_id, edge_id).await?;

        self.gateway
            .delete_pool(edge_id, &binding.backend_id)
            .await
            .inspect_err(|e| tracing::error!("failed to delete pool on edge {}: {}", edge_id, e))?;

        self.bindings.delete(ObjectKind::Pool, pool_id, edge_id).await
    }

    // =========================================================================
    // Health monitor
    // =========================================================================

    pub async fn create_health_monitor(&self, edge_id: &str, monitor: &HealthMonitor) -> Result<Binding> {
        let edge_monitor = Translator::to_backend_monitor(monitor);
        let created = self
            .gateway
            .create_health_monitor(edge_id, &edge_monitor)
            .await
            .inspect_err(|e| {
                tracing::error!("failed to create monitor on edge {}: {}", edge_id, e)
            })?;

        let binding = Binding::new(
            ObjectKind::HealthMonitor,
            &monitor.id,
            edge_id,
            object_id_from_location(&created.location),
        );
        self.bindings.put(binding.clone()).await?;
        Ok(binding)
    }

    pub async fn get_health_monitor(&self, edge_id: &str, monitor_id: &str) -> Result<MonitorSnapshot> {
        let binding = self
            .binding(ObjectKind::HealthMonitor, monitor_id, edge_id)
            .await?;
        let edge_monitor = self
            .gateway
            .get_health_monitor(edge_id, &binding.backend_id)
            .await
            .inspect_err(|e| tracing::error!("failed to get monitor on edge {}: {}", edge_id, e))?;

        Ok(Translator::from_backend_monitor(&edge_monitor))
    }

    /// The binding is resolved from the old monitor's id.
    pub async fn update_health_monitor(
        &self,
        edge_id: &str,
        old_monitor: &HealthMonitor,
        monitor: &HealthMonitor,
    ) -> Result<()> {
        let binding = self
            .binding(ObjectKind::HealthMonitor, &old_monitor.id, edge_id)
            .await?;
        let edge_monitor = Translator::to_backend_monitor(monitor);

        self.gateway
            .update_health_monitor(edge_id, &binding.backend_id, &edge_monitor)
            .await
            .inspect_err(|e| {
                tracing::error!("failed to update monitor on edge {}: {}", edge_id, e)
            })
    }

    pub async fn delete_health_monitor(&self, edge_id: &str, monitor_id: &str) -> Result<()> {
        let binding = self
            .binding(ObjectKind::HealthMonitor, monitor_id, edge_id)
            .await?;

        self.gateway
            .delete_health_monitor(edge_id, &binding.backend_id)
            .await
            .inspect_err(|e| tracing::error!("failed to delete monitor on edge {}: {}", edge_id, e))?;

        self.bindings
            .delete(ObjectKind::HealthMonitor, monitor_id, edge_id)
            .await
    }
}
