//! vShield Edge Gateway
//!
//! Implements EdgeGateway over the edge management API. Every load balancer
//! object lives under `/api/4.0/edges/{edge}/loadbalancer/config/{kind}`
//! and is exchanged as JSON.

use super::rest_client::{RestClient, RestResponse};
use crate::domain::edge_objects::{CreatedObject, EdgeAppProfile, EdgeMonitor, EdgePool, EdgeVip};
use crate::domain::error::{DriverError, Result};
use crate::domain::ports::EdgeGateway;
use async_trait::async_trait;
use serde::Serialize;

const URI_PREFIX: &str = "api/4.0/edges";

const VIRTUAL_SERVERS: &str = "virtualservers";
const POOLS: &str = "pools";
const MONITORS: &str = "monitors";
const APP_PROFILES: &str = "applicationprofiles";

pub struct VcnsEdgeGateway {
    client: RestClient,
}

impl VcnsEdgeGateway {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    fn collection(edge_id: &str, kind: &str) -> String {
        format!("{}/{}/loadbalancer/config/{}", URI_PREFIX, edge_id, kind)
    }

    fn item(edge_id: &str, kind: &str, object_id: &str) -> String {
        format!("{}/{}", Self::collection(edge_id, kind), object_id)
    }

    async fn create<T: Serialize + Sync>(&self, edge_id: &str, kind: &str, object: &T) -> Result<CreatedObject> {
        let body = to_value(object)?;
        let response = self
            .client
            .create_resource(&Self::collection(edge_id, kind), kind, &body)
            .await?;
        let location = response.require_location(kind)?.to_string();

        Ok(CreatedObject {
            location,
            body: response.body,
        })
    }

    async fn get(&self, edge_id: &str, kind: &str, object_id: &str) -> Result<RestResponse> {
        self.client
            .retrieve_resource(&Self::item(edge_id, kind, object_id))
            .await
    }

    async fn update<T: Serialize + Sync>(
        &self,
        edge_id: &str,
        kind: &str,
        object_id: &str,
        object: &T,
    ) -> Result<()> {
        let body = to_value(object)?;
        self.client
            .update_resource(&Self::item(edge_id, kind, object_id), kind, &body)
            .await?;
        Ok(())
    }

    async fn delete(&self, edge_id: &str, kind: &str, object_id: &str) -> Result<()> {
        self.client
            .remove_resource(&Self::item(edge_id, kind, object_id))
            .await?;
        Ok(())
    }
}

fn to_value<T: Serialize>(object: &T) -> Result<serde_json::Value> {
    serde_json::to_value(object)
        .map_err(|e| DriverError::InvalidResponse(format!("cannot encode edge object: {}", e)))
}

#[async_trait]
impl EdgeGateway for VcnsEdgeGateway {
    async fn create_app_profile(&self, edge_id: &str, profile: &EdgeAppProfile) -> Result<CreatedObject> {
        self.create(edge_id, APP_PROFILES, profile).await
    }

    async fn update_app_profile(&self, edge_id: &str, profile_id: &str, profile: &EdgeAppProfile) -> Result<()> {
        self.update(edge_id, APP_PROFILES, profile_id, profile).await
    }

    async fn delete_app_profile(&self, edge_id: &str, profile_id: &str) -> Result<()> {
        self.delete(edge_id, APP_PROFILES, profile_id).await
    }

    async fn create_vip(&self, edge_id: &str, vip: &EdgeVip) -> Result<CreatedObject> {
        self.create(edge_id, VIRTUAL_SERVERS, vip).await
    }

    async fn get_vip(&self, edge_id: &str, vip_id: &str) -> Result<EdgeVip> {
        self.get(edge_id, VIRTUAL_SERVERS, vip_id).await?.json()
    }

    async fn update_vip(&self, edge_id: &str, vip_id: &str, vip: &EdgeVip) -> Result<()> {
        self.update(edge_id, VIRTUAL_SERVERS, vip_id, vip).await
    }

    async fn delete_vip(&self, edge_id: &str, vip_id: &str) -> Result<()> {
        self.delete(edge_id, VIRTUAL_SERVERS, vip_id).await
    }

    async fn create_pool(&self, edge_id: &str, pool: &EdgePool) -> Result<CreatedObject> {
        self.create(edge_id, POOLS, pool).await
    }

    async fn get_pool(&self, edge_id: &str, pool_id: &str) -> Result<EdgePool> {
        self.get(edge_id, POOLS, pool_id).await?.json()
    }

    async fn update_pool(&self, edge_id: &str, pool_id: &str, pool: &EdgePool) -> Result<()> {
        self.update(edge_id, POOLS, pool_id, pool).await
    }

    async fn delete_pool(&self, edge_id: &str, pool_id: &str) -> Result<()> {
        self.delete(edge_id, POOLS, pool_id).await
    }

    async fn create_health_monitor(&self, edge_id: &str, monitor: &EdgeMonitor) -> Result<CreatedObject> {
        self.create(edge_id, MONITORS, monitor).await
    }

    async fn get_health_monitor(&self, edge_id: &str, monitor_id: &str) -> Result<EdgeMonitor> {
        self.get(edge_id, MONITORS, monitor_id).await?.json()
    }

    async fn update_health_monitor(&self, edge_id: &str, monitor_id: &str, monitor: &EdgeMonitor) -> Result<()> {
        self.update(edge_id, MONITORS, monitor_id, monitor).await
    }

    async fn delete_health_monitor(&self, edge_id: &str, monitor_id: &str) -> Result<()> {
        self.delete(edge_id, MONITORS, monitor_id).await
    }
}
