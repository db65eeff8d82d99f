//! Edge Gateway Port
//!
//! Operations of the edge appliance's load balancer management API.

use crate::domain::edge_objects::{CreatedObject, EdgeAppProfile, EdgeMonitor, EdgePool, EdgeVip};
use crate::domain::error::Result;
use async_trait::async_trait;

/// Load balancer configuration calls against one edge instance.
///
/// Every call fails with `BackendUnavailable` on transport or authentication
/// failure and `BackendRejected` on an error status.
#[async_trait]
pub trait EdgeGateway: Send + Sync {
    async fn create_app_profile(&self, edge_id: &str, profile: &EdgeAppProfile) -> Result<CreatedObject>;
    async fn update_app_profile(&self, edge_id: &str, profile_id: &str, profile: &EdgeAppProfile) -> Result<()>;
    async fn delete_app_profile(&self, edge_id: &str, profile_id: &str) -> Result<()>;

    async fn create_vip(&self, edge_id: &str, vip: &EdgeVip) -> Result<CreatedObject>;
    async fn get_vip(&self, edge_id: &str, vip_id: &str) -> Result<EdgeVip>;
    async fn update_vip(&self, edge_id: &str, vip_id: &str, vip: &EdgeVip) -> Result<()>;
    async fn delete_vip(&self, edge_id: &str, vip_id: &str) -> Result<()>;

    async fn create_pool(&self, edge_id: &str, pool: &EdgePool) -> Result<CreatedObject>;
    async fn get_pool(&self, edge_id: &str, pool_id: &str) -> Result<EdgePool>;
    async fn update_pool(&self, edge_id: &str, pool_id: &str, pool: &EdgePool) -> Result<()>;
    async fn delete_pool(&self, edge_id: &str, pool_id: &str) -> Result<()>;

    async fn create_health_monitor(&self, edge_id: &str, monitor: &EdgeMonitor) -> Result<CreatedObject>;
    async fn get_health_monitor(&self, edge_id: &str, monitor_id: &str) -> Result<EdgeMonitor>;
    async fn update_health_monitor(&self, edge_id: &str, monitor_id: &str, monitor: &EdgeMonitor) -> Result<()>;
    async fn delete_health_monitor(&self, edge_id: &str, monitor_id: &str) -> Result<()>;
}
