//! Agent Callbacks
//!
//! Notifications agents push back to the platform: VIP port plug/unplug,
//! pool stats and pool destruction.

use crate::domain::entities::{PoolStats, PortUpdate};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::{LoadBalancerRepository, NetworkProvider};
use std::sync::Arc;
use uuid::Uuid;

/// Device owner stamped on a plugged VIP port.
pub const DEVICE_OWNER_LOADBALANCER: &str = "neutron:LOADBALANCER";

/// Device id of a port plugged by the agent on `host`.
pub fn device_id_for_host(host: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_DNS, host.as_bytes()).to_string()
}

pub struct AgentCallbacks {
    network: Arc<dyn NetworkProvider>,
    repository: Arc<dyn LoadBalancerRepository>,
}

impl AgentCallbacks {
    pub fn new(network: Arc<dyn NetworkProvider>, repository: Arc<dyn LoadBalancerRepository>) -> Self {
        Self {
            network,
            repository,
        }
    }

    /// Bring the VIP port up and mark it owned by the agent's host.
    ///
    /// No port id, or a port already gone, is a no-op. A port that vanishes
    /// between the lookup and the update is an error.
    pub async fn plug_vip_port(&self, port_id: Option<&str>, host: &str) -> Result<()> {
        let Some(port_id) = port_id else {
            return Ok(());
        };

        match self.network.get_port(port_id).await {
            Ok(_) => {}
            Err(DriverError::PortNotFound { .. }) => {
                tracing::debug!("unable to find port {} to plug", port_id);
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        let update = PortUpdate {
            admin_state_up: Some(true),
            device_owner: Some(DEVICE_OWNER_LOADBALANCER.to_string()),
            device_id: Some(device_id_for_host(host)),
        };
        self.network
            .update_port(port_id, update)
            .await
            .inspect_err(|e| tracing::error!("failed to plug vip port {}: {}", port_id, e))?;

        tracing::info!("plugged vip port {} for host {}", port_id, host);
        Ok(())
    }

    /// Bring the VIP port down and clear its owner. A missing port at any
    /// step means the VIP was deleted first and is not an error.
    pub async fn unplug_vip_port(&self, port_id: Option<&str>, host: &str) -> Result<()> {
        let Some(port_id) = port_id else {
            return Ok(());
        };

        let unplug = async {
            self.network.get_port(port_id).await?;
            let update = PortUpdate {
                admin_state_up: Some(false),
                device_owner: Some(String::new()),
                device_id: Some(String::new()),
            };
            self.network.update_port(port_id, update).await
        };

        match unplug.await {
            Ok(_) => {
                tracing::info!("unplugged vip port {} for host {}", port_id, host);
                Ok(())
            }
            Err(DriverError::PortNotFound { .. }) => {
                tracing::debug!(
                    "unable to find port {} to unplug, the vip may have been deleted first",
                    port_id
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn update_pool_stats(&self, pool_id: &str, stats: PoolStats, host: &str) -> Result<()> {
        tracing::debug!("stats for pool {} from host {}", pool_id, host);
        self.repository.update_pool_stats(pool_id, stats).await
    }

    /// Confirmation that an agent destroyed a pool. Nothing to do.
    pub async fn pool_destroyed(&self, pool_id: &str, host: &str) {
        tracing::debug!("pool {} destroyed on host {}", pool_id, host);
    }
}
