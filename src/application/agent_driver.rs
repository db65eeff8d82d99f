//! Agent Load Balancer Driver
//!
//! Drives appliances fronted by a per-host agent. For every operation the
//! driver resolves the owning agent, computes the network context of the
//! object and casts the operation to the agent. The driver also owns the
//! SNAT port of each pool subnet.

use super::agent_rpc::AgentRpcApi;
use super::snat_ports::SnatPortManager;
use crate::domain::entities::{HealthMonitor, Member, NetworkInfo, Pool, Vip};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::{LoadBalancerRepository, Messenger, NetworkProvider, PoolScheduler};
use crate::domain::value_objects::SnatMode;
use std::sync::Arc;

/// Topic prefix of the agents' queues.
pub const TOPIC_LOADBALANCER_AGENT: &str = "lbaas_netscaler_agent";

/// Topic the agents report back on.
pub const TOPIC_LOADBALANCER_DEVICE: &str = "q-lbaas-netscaler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDriverConfig {
    pub agent_topic: String,
    pub device_topic: String,
    pub snat_mode: SnatMode,
}

impl Default for AgentDriverConfig {
    fn default() -> Self {
        Self {
            agent_topic: TOPIC_LOADBALANCER_AGENT.to_string(),
            device_topic: TOPIC_LOADBALANCER_DEVICE.to_string(),
            snat_mode: SnatMode::Unlocked,
        }
    }
}

pub struct AgentLoadBalancerDriver {
    repository: Arc<dyn LoadBalancerRepository>,
    network: Arc<dyn NetworkProvider>,
    scheduler: Arc<dyn PoolScheduler>,
    agent_rpc: AgentRpcApi,
    snat_ports: SnatPortManager,
    config: AgentDriverConfig,
}

impl AgentLoadBalancerDriver {
    pub fn new(
        config: AgentDriverConfig,
        repository: Arc<dyn LoadBalancerRepository>,
        network: Arc<dyn NetworkProvider>,
        scheduler: Arc<dyn PoolScheduler>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        let agent_rpc = AgentRpcApi::new(messenger, config.agent_topic.clone());
        let snat_ports = SnatPortManager::new(network.clone(), repository.clone(), config.snat_mode);
        Self {
            repository,
            network,
            scheduler,
            agent_rpc,
            snat_ports,
            config,
        }
    }

    pub fn config(&self) -> &AgentDriverConfig {
        &self.config
    }

    pub fn snat_ports(&self) -> &SnatPortManager {
        &self.snat_ports
    }

    /// Host of the agent hosting `pool_id`. Fails with `NoActiveAgent`.
    pub async fn get_pool_agent(&self, pool_id: &str) -> Result<String> {
        match self.repository.get_agent_hosting_pool(pool_id).await? {
            Some(agent) => Ok(agent.host),
            None => {
                let err = DriverError::NoActiveAgent {
                    pool_id: pool_id.to_string(),
                };
                tracing::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Network context of a subnet. Provider attributes are copied only
    /// when the network has them.
    async fn subnet_network_info(&self, subnet_id: &str) -> Result<NetworkInfo> {
        let subnet = self.network.get_subnet(subnet_id).await?;
        let network = self.network.get_network(&subnet.network_id).await?;

        Ok(NetworkInfo {
            port_id: None,
            network_id: subnet.network_id,
            subnet_id: subnet_id.to_string(),
            network_type: network.network_type,
            segmentation_id: network.segmentation_id,
            snat_ip: None,
        })
    }

    pub async fn vip_network_info(&self, vip: &Vip) -> Result<NetworkInfo> {
        let mut info = self.subnet_network_info(&vip.subnet_id).await?;
        info.port_id = vip.port_id.clone();
        Ok(info)
    }

    pub async fn pool_network_info(&self, pool: &Pool) -> Result<NetworkInfo> {
        self.subnet_network_info(&pool.subnet_id).await
    }

    /// Network context of the pool a member or monitor belongs to.
    async fn owning_pool_network_info(&self, pool_id: &str) -> Result<NetworkInfo> {
        let pool = self.repository.get_pool(pool_id).await?;
        self.pool_network_info(&pool).await
    }

    // =========================================================================
    // VIP
    // =========================================================================

    pub async fn create_vip(&self, vip: &Vip) -> Result<()> {
        let host = self.get_pool_agent(&vip.pool_id).await?;
        let netinfo = self.vip_network_info(vip).await?;

        self.agent_rpc.create_vip(vip, &netinfo, &host).await;
        tracing::info!("create_vip {} sent to agent on {}", vip.id, host);
        Ok(())
    }

    pub async fn update_vip(&self, old_vip: &Vip, vip: &Vip) -> Result<()> {
        let host = self.get_pool_agent(&vip.pool_id).await?;
        let old_netinfo = self.vip_network_info(old_vip).await?;
        let netinfo = self.vip_network_info(vip).await?;

        self.agent_rpc
            .update_vip(old_vip, vip, &old_netinfo, &netinfo, &host)
            .await;
        tracing::info!("update_vip {} sent to agent on {}", vip.id, host);
        Ok(())
    }

    /// Cast the delete, then remove the VIP record.
    pub async fn delete_vip(&self, vip: &Vip) -> Result<()> {
        let host = self.get_pool_agent(&vip.pool_id).await?;
        let netinfo = self.vip_network_info(vip).await?;

        self.agent_rpc.delete_vip(vip, &netinfo, &host).await;
        tracing::info!("delete_vip {} sent to agent on {}", vip.id, host);

        self.repository.delete_vip(&vip.id).await
    }

    // =========================================================================
    // Pool
    // =========================================================================

    /// Schedule the pool, make sure its subnet has a SNAT port and cast the
    /// create. Nothing is provisioned when scheduling fails.
    pub async fn create_pool(&self, pool: &Pool) -> Result<()> {
        tracing::debug!("pool to be created: {:?}", pool);

        let agent = self.scheduler.schedule(pool).await?.ok_or_else(|| {
            let err = DriverError::NoEligibleAgent {
                pool_id: pool.id.clone(),
            };
            tracing::error!("{}", err);
            err
        })?;

        let mut netinfo = self.pool_network_info(pool).await?;
        self.snat_ports
            .ensure(&pool.tenant_id, &pool.subnet_id, &mut netinfo)
            .await?;

        self.agent_rpc.create_pool(pool, &netinfo, &agent.host).await;
        tracing::info!("create_pool {} sent to agent on {}", pool.id, agent.host);
        Ok(())
    }

    /// When the subnet changes, the new subnet's SNAT port is ensured before
    /// the cast and the old one is released after it.
    pub async fn update_pool(&self, old_pool: &Pool, pool: &Pool) -> Result<()> {
        let host = self.get_pool_agent(&pool.id).await?;
        let old_netinfo = self.pool_network_info(old_pool).await?;
        let mut netinfo = self.pool_network_info(pool).await?;

        let subnet_changed = pool.subnet_id != old_pool.subnet_id;
        if subnet_changed {
            self.snat_ports
                .ensure(&pool.tenant_id, &pool.subnet_id, &mut netinfo)
                .await?;
        }

        self.agent_rpc
            .update_pool(old_pool, pool, &old_netinfo, &netinfo, &host)
            .await;
        tracing::info!("update_pool {} sent to agent on {}", pool.id, host);

        if subnet_changed {
            self.snat_ports
                .release_if_unused(&old_pool.tenant_id, &old_pool.subnet_id)
                .await?;
        }
        Ok(())
    }

    /// Cast the delete, remove the pool record, then release the subnet's
    /// SNAT port if this was its last pool.
    pub async fn delete_pool(&self, pool: &Pool) -> Result<()> {
        tracing::debug!("pool to be deleted: {:?}", pool);

        let host = self.get_pool_agent(&pool.id).await?;
        let netinfo = self.pool_network_info(pool).await?;

        self.agent_rpc.delete_pool(pool, &netinfo, &host).await;
        tracing::info!("delete_pool {} sent to agent on {}", pool.id, host);

        self.repository.delete_pool(&pool.id).await?;
        self.snat_ports
            .release_if_unused(&pool.tenant_id, &pool.subnet_id)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Member
    // =========================================================================

    pub async fn create_member(&self, member: &Member) -> Result<()> {
        let host = self.get_pool_agent(&member.pool_id).await?;
        let netinfo = self.owning_pool_network_info(&member.pool_id).await?;

        self.agent_rpc.create_member(member, &netinfo, &host).await;
        tracing::info!("create_member {} sent to agent on {}", member.id, host);
        Ok(())
    }

    pub async fn update_member(&self, old_member: &Member, member: &Member) -> Result<()> {
        let host = self.get_pool_agent(&member.pool_id).await?;
        let old_netinfo = self.owning_pool_network_info(&old_member.pool_id).await?;
        let netinfo = self.owning_pool_network_info(&member.pool_id).await?;

        self.agent_rpc
            .update_member(old_member, member, &old_netinfo, &netinfo, &host)
            .await;
        tracing::info!("update_member {} sent to agent on {}", member.id, host);
        Ok(())
    }

    pub async fn delete_member(&self, member: &Member) -> Result<()> {
        let host = self.get_pool_agent(&member.pool_id).await?;
        let netinfo = self.owning_pool_network_info(&member.pool_id).await?;

        self.agent_rpc.delete_member(member, &netinfo, &host).await;
        tracing::info!("delete_member {} sent to agent on {}", member.id, host);

        self.repository.delete_member(&member.id).await
    }

    // =========================================================================
    // Health monitor
    // =========================================================================

    pub async fn create_pool_health_monitor(&self, health_monitor: &HealthMonitor, pool_id: &str) -> Result<()> {
        let host = self.get_pool_agent(pool_id).await?;
        let netinfo = self.owning_pool_network_info(pool_id).await?;

        self.agent_rpc
            .create_pool_health_monitor(health_monitor, pool_id, &netinfo, &host)
            .await;
        tracing::info!(
            "create_pool_health_monitor {} sent to agent on {}",
            health_monitor.id,
            host
        );
        Ok(())
    }

    pub async fn update_health_monitor(
        &self,
        old_health_monitor: &HealthMonitor,
        health_monitor: &HealthMonitor,
        pool_id: &str,
    ) -> Result<()> {
        let host = self.get_pool_agent(pool_id).await?;
        let netinfo = self.owning_pool_network_info(pool_id).await?;

        self.agent_rpc
            .update_health_monitor(old_health_monitor, health_monitor, pool_id, &netinfo, &host)
            .await;
        tracing::info!(
            "update_health_monitor {} sent to agent on {}",
            health_monitor.id,
            host
        );
        Ok(())
    }

    /// Cast the delete, then detach the monitor from the pool record.
    pub async fn delete_pool_health_monitor(&self, health_monitor: &HealthMonitor, pool_id: &str) -> Result<()> {
        let host = self.get_pool_agent(pool_id).await?;
        let netinfo = self.owning_pool_network_info(pool_id).await?;

        self.agent_rpc
            .delete_pool_health_monitor(health_monitor, pool_id, &netinfo, &host)
            .await;
        tracing::info!(
            "delete_pool_health_monitor {} sent to agent on {}",
            health_monitor.id,
            host
        );

        self.repository
            .delete_pool_health_monitor(&health_monitor.id, pool_id)
            .await
    }

    // =========================================================================
    // Agent
    // =========================================================================

    /// Tell the agent on `host` that its admin state changed.
    pub async fn agent_updated(&self, admin_state_up: bool, host: &str) {
        self.agent_rpc.agent_updated(admin_state_up, host).await;
    }

    /// Stats are pushed by the agents through the callbacks; nothing to pull.
    pub async fn stats(&self, pool_id: &str) -> Result<()> {
        tracing::debug!("stats requested for pool {}", pool_id);
        Ok(())
    }
}
