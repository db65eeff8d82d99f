//! SNAT Port Lifecycle
//!
//! One SNAT port per (tenant, subnet), shared by every pool on the subnet.
//! There is no stored reference count: release re-queries the pools on the
//! subnet and deletes the port only when none remain.
//!
//! In `SnatMode::Unlocked` ensure and release are plain read-then-write and
//! race under concurrent attach/detach on one subnet: two creators can both
//! see no port, and a releaser can delete a port a creator is about to use.
//! `SnatMode::PerSubnetLock` serializes both calls per (tenant, subnet)
//! inside this process. A subnet's lock is dropped when a release removes
//! its port, so the lock map only holds subnets that have a port.

use crate::domain::entities::{FixedIpRequest, NetworkInfo, NewPort, PoolFilter, Port, PortFilter};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::{LoadBalancerRepository, NetworkProvider};
use crate::domain::value_objects::{snat_port_name, SnatMode};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SubnetKey = (String, String);

pub struct SnatPortManager {
    network: Arc<dyn NetworkProvider>,
    repository: Arc<dyn LoadBalancerRepository>,
    mode: SnatMode,
    locks: DashMap<SubnetKey, Arc<Mutex<()>>>,
}

impl SnatPortManager {
    pub fn new(
        network: Arc<dyn NetworkProvider>,
        repository: Arc<dyn LoadBalancerRepository>,
        mode: SnatMode,
    ) -> Self {
        Self {
            network,
            repository,
            mode,
            locks: DashMap::new(),
        }
    }

    pub fn mode(&self) -> SnatMode {
        self.mode
    }

    /// Find the subnet's SNAT port, creating it if absent, and record it in
    /// `netinfo` (`port_id` and `snat_ip`).
    pub async fn ensure(&self, tenant_id: &str, subnet_id: &str, netinfo: &mut NetworkInfo) -> Result<Port> {
        let port = match self.mode {
            SnatMode::Unlocked => self.ensure_unlocked(tenant_id, subnet_id).await?,
            SnatMode::PerSubnetLock => {
                let _guard = self.lock_subnet(tenant_id, subnet_id).await;
                self.ensure_unlocked(tenant_id, subnet_id).await?
            }
        };

        netinfo.port_id = Some(port.id.clone());
        netinfo.snat_ip = port.fixed_ips.first().map(|ip| ip.ip_address.clone());
        tracing::info!("SNAT port {} serves subnet {}", port.id, subnet_id);
        Ok(port)
    }

    /// Delete the subnet's SNAT port if no pool of the tenant remains on it.
    /// Returns true when a port was removed.
    pub async fn release_if_unused(&self, tenant_id: &str, subnet_id: &str) -> Result<bool> {
        match self.mode {
            SnatMode::Unlocked => self.release_unlocked(tenant_id, subnet_id).await,
            SnatMode::PerSubnetLock => {
                let guard = self.lock_subnet(tenant_id, subnet_id).await;
                let removed = self.release_unlocked(tenant_id, subnet_id).await;
                drop(guard);
                if matches!(removed, Ok(true)) {
                    self.forget_subnet(tenant_id, subnet_id);
                }
                removed
            }
        }
    }

    /// The subnet's SNAT port, if one exists.
    pub async fn find(&self, tenant_id: &str, subnet_id: &str) -> Result<Option<Port>> {
        let subnet = self.network.get_subnet(subnet_id).await?;
        let name = snat_port_name(subnet_id);

        tracing::debug!(
            "filtering ports on network_id={} tenant_id={} name={}",
            subnet.network_id,
            tenant_id,
            name
        );
        let filter = PortFilter {
            network_id: Some(subnet.network_id),
            tenant_id: Some(tenant_id.to_string()),
            name: Some(name),
        };

        Ok(self.network.list_ports(&filter).await?.into_iter().next())
    }

    async fn ensure_unlocked(&self, tenant_id: &str, subnet_id: &str) -> Result<Port> {
        if let Some(port) = self.find(tenant_id, subnet_id).await? {
            tracing::debug!("found existing SNAT port for subnet {}", subnet_id);
            return Ok(port);
        }

        tracing::info!("no SNAT port for subnet {}, creating one", subnet_id);
        let subnet = self.network.get_subnet(subnet_id).await?;
        self.network
            .create_port(NewPort {
                tenant_id: tenant_id.to_string(),
                name: snat_port_name(subnet_id),
                network_id: subnet.network_id,
                admin_state_up: false,
                device_id: String::new(),
                device_owner: String::new(),
                fixed_ips: vec![FixedIpRequest {
                    subnet_id: subnet.id,
                    ip_address: None,
                }],
            })
            .await
    }

    async fn release_unlocked(&self, tenant_id: &str, subnet_id: &str) -> Result<bool> {
        let pools = self
            .repository
            .list_pools(&PoolFilter::on_subnet(tenant_id, subnet_id))
            .await?;
        if !pools.is_empty() {
            tracing::debug!(
                "{} pools still on subnet {}, keeping SNAT port",
                pools.len(),
                subnet_id
            );
            return Ok(false);
        }

        let Some(port) = self.find(tenant_id, subnet_id).await? else {
            return Ok(false);
        };

        match self.network.delete_port(&port.id).await {
            Ok(()) => {
                tracing::info!(
                    "removed SNAT port {} for subnet {}, last pool gone",
                    port.id,
                    subnet_id
                );
                Ok(true)
            }
            Err(DriverError::PortNotFound { port_id }) => {
                tracing::warn!("SNAT port {} already removed", port_id);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn lock_subnet(&self, tenant_id: &str, subnet_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry((tenant_id.to_string(), subnet_id.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the subnet's lock once its port is gone, unless another call
    /// holds or waits on it.
    fn forget_subnet(&self, tenant_id: &str, subnet_id: &str) {
        self.locks
            .remove_if(&(tenant_id.to_string(), subnet_id.to_string()), |_, lock| {
                Arc::strong_count(lock) == 1
            });
    }
}
