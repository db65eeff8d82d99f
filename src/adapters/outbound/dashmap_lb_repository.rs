//! DashMap Load Balancer Repository
//!
//! Implements LoadBalancerRepository using DashMap for concurrent access.
//! Records live in process memory; the platform service seeds them with
//! `upsert_*` and `register_agent`.

use crate::domain::entities::{Agent, Member, Pool, PoolFilter, PoolStats, Vip};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::LoadBalancerRepository;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// DashMap-backed load balancer records.
pub struct DashMapLbRepository {
    vips: Arc<DashMap<String, Vip>>,
    pools: Arc<DashMap<String, Pool>>,
    agents: Arc<DashMap<String, Agent>>,
    /// pool_id -> agent_id
    hosting: Arc<DashMap<String, String>>,
    stats: Arc<DashMap<String, PoolStats>>,
}

impl DashMapLbRepository {
    pub fn new() -> Self {
        Self {
            vips: Arc::new(DashMap::new()),
            pools: Arc::new(DashMap::new()),
            agents: Arc::new(DashMap::new()),
            hosting: Arc::new(DashMap::new()),
            stats: Arc::new(DashMap::new()),
        }
    }

    pub fn upsert_pool(&self, pool: Pool) {
        self.pools.insert(pool.id.clone(), pool);
    }

    pub fn upsert_vip(&self, vip: Vip) {
        self.vips.insert(vip.id.clone(), vip);
    }

    /// Add a member to its pool. Fails with `PoolNotFound` if the pool is unknown.
    pub fn add_member(&self, member: Member) -> Result<()> {
        let mut pool = self
            .pools
            .get_mut(&member.pool_id)
            .ok_or_else(|| DriverError::PoolNotFound {
                pool_id: member.pool_id.clone(),
            })?;
        pool.members.retain(|m| m.id != member.id);
        pool.members.push(member);
        Ok(())
    }

    /// Register or refresh an agent heartbeat record.
    pub fn register_agent(&self, agent: Agent) {
        tracing::debug!("registered agent {} on host {}", agent.id, agent.host);
        self.agents.insert(agent.id.clone(), agent);
    }

    pub fn vip(&self, vip_id: &str) -> Option<Vip> {
        self.vips.get(vip_id).map(|e| e.value().clone())
    }

    pub fn pool_stats(&self, pool_id: &str) -> Option<PoolStats> {
        self.stats.get(pool_id).map(|e| e.value().clone())
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

impl Default for DashMapLbRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoadBalancerRepository for DashMapLbRepository {
    async fn get_pool(&self, pool_id: &str) -> Result<Pool> {
        self.pools
            .get(pool_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| DriverError::PoolNotFound {
                pool_id: pool_id.to_string(),
            })
    }

    async fn list_pools(&self, filter: &PoolFilter) -> Result<Vec<Pool>> {
        Ok(self
            .pools
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect())
    }

    async fn delete_vip(&self, vip_id: &str) -> Result<()> {
        self.vips.remove(vip_id);
        Ok(())
    }

    async fn delete_pool(&self, pool_id: &str) -> Result<()> {
        self.pools.remove(pool_id);
        self.hosting.remove(pool_id);
        self.stats.remove(pool_id);
        Ok(())
    }

    async fn delete_member(&self, member_id: &str) -> Result<()> {
        for mut pool in self.pools.iter_mut() {
            pool.members.retain(|m| m.id != member_id);
        }
        Ok(())
    }

    async fn delete_pool_health_monitor(&self, monitor_id: &str, pool_id: &str) -> Result<()> {
        if let Some(mut pool) = self.pools.get_mut(pool_id) {
            pool.health_monitors.retain(|id| id != monitor_id);
        }
        Ok(())
    }

    async fn get_agent_hosting_pool(&self, pool_id: &str) -> Result<Option<Agent>> {
        let agent_id = match self.hosting.get(pool_id) {
            Some(entry) => entry.value().clone(),
            None => return Ok(None),
        };
        Ok(self.agents.get(&agent_id).map(|e| e.value().clone()))
    }

    async fn list_active_agents(&self) -> Result<Vec<Agent>> {
        let mut agents: Vec<Agent> = self
            .agents
            .iter()
            .filter(|e| e.value().is_active())
            .map(|e| e.value().clone())
            .collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(agents)
    }

    async fn bind_pool_to_agent(&self, pool_id: &str, agent_id: &str) -> Result<()> {
        self.hosting.insert(pool_id.to_string(), agent_id.to_string());
        Ok(())
    }

    async fn update_pool_stats(&self, pool_id: &str, stats: PoolStats) -> Result<()> {
        if !self.pools.contains_key(pool_id) {
            return Err(DriverError::PoolNotFound {
                pool_id: pool_id.to_string(),
            });
        }
        self.stats.insert(pool_id.to_string(), stats);
        Ok(())
    }
}
