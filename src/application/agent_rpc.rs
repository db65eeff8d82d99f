//! Agent RPC API
//!
//! Driver side of the driver-to-agent protocol. Every call is a one-way
//! cast to `{topic}.{host}`; nothing waits for the agent.

use crate::domain::entities::{HealthMonitor, Member, NetworkInfo, Pool, Vip};
use crate::domain::ports::{AgentMessage, Messenger};
use serde_json::{json, Value};
use std::sync::Arc;

/// Version stamped on every message unless a call needs a newer one.
pub const BASE_RPC_API_VERSION: &str = "1.0";

/// `agent_updated` was added in 1.1.
pub const AGENT_UPDATED_VERSION: &str = "1.1";

pub struct AgentRpcApi {
    messenger: Arc<dyn Messenger>,
    topic: String,
}

impl AgentRpcApi {
    pub fn new(messenger: Arc<dyn Messenger>, topic: impl Into<String>) -> Self {
        Self {
            messenger,
            topic: topic.into(),
        }
    }

    /// Queue name of the agent running on `host`.
    pub fn host_topic(&self, host: &str) -> String {
        format!("{}.{}", self.topic, host)
    }

    async fn cast(&self, host: &str, method: &str, args: Value, version: &str) {
        let topic = self.host_topic(host);
        tracing::debug!("cast {} to {}", method, topic);
        self.messenger
            .cast(
                &topic,
                AgentMessage {
                    method: method.to_string(),
                    version: version.to_string(),
                    args,
                },
            )
            .await;
    }

    pub async fn create_vip(&self, vip: &Vip, netinfo: &NetworkInfo, host: &str) {
        let args = json!({ "vip": vip, "netinfo": netinfo });
        self.cast(host, "create_vip", args, BASE_RPC_API_VERSION).await
    }

    pub async fn update_vip(
        &self,
        old_vip: &Vip,
        vip: &Vip,
        old_netinfo: &NetworkInfo,
        netinfo: &NetworkInfo,
        host: &str,
    ) {
        let args = json!({
            "old_vip": old_vip,
            "vip": vip,
            "old_netinfo": old_netinfo,
            "netinfo": netinfo,
        });
        self.cast(host, "update_vip", args, BASE_RPC_API_VERSION).await
    }

    pub async fn delete_vip(&self, vip: &Vip, netinfo: &NetworkInfo, host: &str) {
        let args = json!({ "vip": vip, "netinfo": netinfo });
        self.cast(host, "delete_vip", args, BASE_RPC_API_VERSION).await
    }

    pub async fn create_pool(&self, pool: &Pool, netinfo: &NetworkInfo, host: &str) {
        let args = json!({ "pool": pool, "netinfo": netinfo });
        self.cast(host, "create_pool", args, BASE_RPC_API_VERSION).await
    }

    pub async fn update_pool(
        &self,
        old_pool: &Pool,
        pool: &Pool,
        old_netinfo: &NetworkInfo,
        netinfo: &NetworkInfo,
        host: &str,
    ) {
        let args = json!({
            "old_pool": old_pool,
            "pool": pool,
            "old_netinfo": old_netinfo,
            "netinfo": netinfo,
        });
        self.cast(host, "update_pool", args, BASE_RPC_API_VERSION).await
    }

    pub async fn delete_pool(&self, pool: &Pool, netinfo: &NetworkInfo, host: &str) {
        let args = json!({ "pool": pool, "netinfo": netinfo });
        self.cast(host, "delete_pool", args, BASE_RPC_API_VERSION).await
    }

    pub async fn create_member(&self, member: &Member, netinfo: &NetworkInfo, host: &str) {
        let args = json!({ "member": member, "netinfo": netinfo });
        self.cast(host, "create_member", args, BASE_RPC_API_VERSION).await
    }

    pub async fn update_member(
        &self,
        old_member: &Member,
        member: &Member,
        old_netinfo: &NetworkInfo,
        netinfo: &NetworkInfo,
        host: &str,
    ) {
        let args = json!({
            "old_member": old_member,
            "member": member,
            "old_netinfo": old_netinfo,
            "netinfo": netinfo,
        });
        self.cast(host, "update_member", args, BASE_RPC_API_VERSION).await
    }

    pub async fn delete_member(&self, member: &Member, netinfo: &NetworkInfo, host: &str) {
        let args = json!({ "member": member, "netinfo": netinfo });
        self.cast(host, "delete_member", args, BASE_RPC_API_VERSION).await
    }

    pub async fn create_pool_health_monitor(
        &self,
        health_monitor: &HealthMonitor,
        pool_id: &str,
        netinfo: &NetworkInfo,
        host: &str,
    ) {
        let args = json!({
            "health_monitor": health_monitor,
            "pool_id": pool_id,
            "netinfo": netinfo,
        });
        self.cast(host, "create_pool_health_monitor", args, BASE_RPC_API_VERSION)
            .await
    }

    pub async fn update_health_monitor(
        &self,
        old_health_monitor: &HealthMonitor,
        health_monitor: &HealthMonitor,
        pool_id: &str,
        netinfo: &NetworkInfo,
        host: &str,
    ) {
        let args = json!({
            "old_health_monitor": old_health_monitor,
            "health_monitor": health_monitor,
            "pool_id": pool_id,
            "netinfo": netinfo,
        });
        self.cast(host, "update_health_monitor", args, BASE_RPC_API_VERSION)
            .await
    }

    pub async fn delete_pool_health_monitor(
        &self,
        health_monitor: &HealthMonitor,
        pool_id: &str,
        netinfo: &NetworkInfo,
        host: &str,
    ) {
        let args = json!({
            "health_monitor": health_monitor,
            "pool_id": pool_id,
            "netinfo": netinfo,
        });
        self.cast(host, "delete_pool_health_monitor", args, BASE_RPC_API_VERSION)
            .await
    }

    pub async fn agent_updated(&self, admin_state_up: bool, host: &str) {
        let args = json!({ "payload": { "admin_state_up": admin_state_up } });
        self.cast(host, "agent_updated", args, AGENT_UPDATED_VERSION).await
    }
}
