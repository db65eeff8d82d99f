//! Load Balancer Repository Port
//!
//! The platform's own load balancer records: pools, agent hosting and
//! stats. The drivers read pools from it and remove records after
//! dispatching deletions.

use crate::domain::entities::{Agent, Pool, PoolFilter, PoolStats};
use crate::domain::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LoadBalancerRepository: Send + Sync {
    /// Fails with `PoolNotFound` when absent.
    async fn get_pool(&self, pool_id: &str) -> Result<Pool>;

    async fn list_pools(&self, filter: &PoolFilter) -> Result<Vec<Pool>>;

    async fn delete_vip(&self, vip_id: &str) -> Result<()>;
    async fn delete_pool(&self, pool_id: &str) -> Result<()>;
    async fn delete_member(&self, member_id: &str) -> Result<()>;

    /// Detach a monitor from a pool.
    async fn delete_pool_health_monitor(&self, monitor_id: &str, pool_id: &str) -> Result<()>;

    /// The agent currently hosting a pool, if any.
    async fn get_agent_hosting_pool(&self, pool_id: &str) -> Result<Option<Agent>>;

    async fn list_active_agents(&self) -> Result<Vec<Agent>>;

    async fn bind_pool_to_agent(&self, pool_id: &str, agent_id: &str) -> Result<()>;

    async fn update_pool_stats(&self, pool_id: &str, stats: PoolStats) -> Result<()>;
}
