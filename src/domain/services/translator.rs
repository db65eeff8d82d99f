//! Translator Service
//!
//! Bidirectional conversion between platform load balancer objects and edge
//! appliance objects. The only state it touches is the binding store, which
//! it reads to turn logical references (pool of a VIP, monitor of a pool)
//! into backend references and back.

use crate::domain::edge_objects::{
    EdgeAppProfile, EdgeMember, EdgeMonitor, EdgePersistence, EdgePool, EdgeVip,
};
use crate::domain::entities::{HealthMonitor, Member, Pool, SessionPersistence, Vip};
use crate::domain::error::Result;
use crate::domain::ports::BindingStore;
use crate::domain::value_objects::{BalanceAlgorithm, MonitorProtocol, ObjectKind};
use serde::Serialize;
use std::sync::Arc;

/// Persistence method the edge applies to every generated app profile.
pub const APP_PROFILE_PERSISTENCE: &str = "sourceip";

/// Protocol template of every generated app profile.
pub const APP_PROFILE_TEMPLATE: &str = "HTTP";

/// VIP fields recoverable from an edge virtual server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VipSnapshot {
    pub name: String,
    pub address: String,
    pub protocol: String,
    pub protocol_port: u16,
    pub pool_id: String,
}

/// Pool fields recoverable from an edge pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub name: String,
}

/// Monitor fields recoverable from an edge monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorSnapshot {
    pub id: String,
    pub delay: u32,
    pub timeout: u32,
    pub max_retries: u32,
}

pub struct Translator {
    bindings: Arc<dyn BindingStore>,
}

impl Translator {
    pub fn new(bindings: Arc<dyn BindingStore>) -> Self {
        Self { bindings }
    }

    /// Build the edge virtual server for a VIP.
    ///
    /// The VIP's pool must already be bound on `edge_id`, otherwise this
    /// fails with `BindingNotFound`.
    pub async fn to_backend_vip(
        &self,
        edge_id: &str,
        vip: &Vip,
        app_profile_id: Option<&str>,
    ) -> Result<EdgeVip> {
        let pool_binding = self
            .bindings
            .get(ObjectKind::Pool, &vip.pool_id, edge_id)
            .await?;

        Ok(EdgeVip {
            name: vip.name.clone(),
            ip_address: vip.address.clone(),
            protocol: vip.protocol.clone(),
            port: vip.protocol_port,
            default_pool_id: pool_binding.backend_id,
            application_profile_id: app_profile_id.map(str::to_string),
        })
    }

    /// Recover VIP fields from an edge virtual server.
    ///
    /// The pool id comes from the reverse binding of `defaultPoolId`.
    pub async fn from_backend_vip(&self, edge_id: &str, edge_vip: &EdgeVip) -> Result<VipSnapshot> {
        let pool_binding = self
            .bindings
            .get_by_backend_id(ObjectKind::Pool, edge_id, &edge_vip.default_pool_id)
            .await?;

        Ok(VipSnapshot {
            name: edge_vip.name.clone(),
            address: edge_vip.ip_address.clone(),
            protocol: edge_vip.protocol.clone(),
            protocol_port: edge_vip.port,
            pool_id: pool_binding.logical_id,
        })
    }

    /// Build the edge pool for a pool and its members.
    ///
    /// The edge accepts a single monitor per pool: only the first monitor
    /// id is resolved, the rest are dropped.
    pub async fn to_backend_pool(
        &self,
        edge_id: &str,
        pool: &Pool,
        members: &[Member],
    ) -> Result<EdgePool> {
        let mut edge_pool = EdgePool {
            name: pool.name.clone(),
            algorithm: BalanceAlgorithm::from_lb_method(&pool.lb_method)
                .as_str()
                .to_string(),
            member: members
                .iter()
                .map(|m| EdgeMember {
                    ip_address: m.address.clone(),
                    port: m.protocol_port,
                })
                .collect(),
            monitor_id: Vec::new(),
        };

        if let Some(first) = pool.health_monitors.first() {
            if pool.health_monitors.len() > 1 {
                tracing::debug!(
                    "pool {} has {} monitors, edge accepts one; using {}",
                    pool.id,
                    pool.health_monitors.len(),
                    first
                );
            }
            let monitor_binding = self
                .bindings
                .get(ObjectKind::HealthMonitor, first, edge_id)
                .await?;
            edge_pool.monitor_id.push(monitor_binding.backend_id);
        }

        Ok(edge_pool)
    }

    pub fn from_backend_pool(edge_pool: &EdgePool) -> PoolSnapshot {
        PoolSnapshot {
            name: edge_pool.name.clone(),
        }
    }

    /// Build the edge monitor. The logical id becomes the edge object name.
    pub fn to_backend_monitor(monitor: &HealthMonitor) -> EdgeMonitor {
        EdgeMonitor {
            monitor_type: MonitorProtocol::from_monitor_type(&monitor.monitor_type)
                .as_str()
                .to_string(),
            interval: monitor.delay,
            timeout: monitor.timeout,
            max_retries: monitor.max_retries,
            name: monitor.id.clone(),
        }
    }

    pub fn from_backend_monitor(edge_monitor: &EdgeMonitor) -> MonitorSnapshot {
        MonitorSnapshot {
            id: edge_monitor.name.clone(),
            delay: edge_monitor.interval,
            timeout: edge_monitor.timeout,
            max_retries: edge_monitor.max_retries,
        }
    }

    /// Build the app profile for a VIP.
    ///
    /// Persistence is always source-ip over the HTTP template; the requested
    /// session persistence is not mapped yet.
    pub fn to_app_profile(name: &str, _persistence: Option<&SessionPersistence>) -> EdgeAppProfile {
        EdgeAppProfile {
            insert_x_forwarded_for: false,
            name: name.to_string(),
            persistence: EdgePersistence {
                method: APP_PROFILE_PERSISTENCE.to_string(),
            },
            server_ssl_enabled: false,
            ssl_passthrough: false,
            template: APP_PROFILE_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Binding;
    use crate::domain::error::DriverError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ===== Mock Implementations =====

    struct MockBindingStore {
        bindings: Mutex<HashMap<(ObjectKind, String, String), Binding>>,
    }

    impl MockBindingStore {
        fn new() -> Self {
            Self {
                bindings: Mutex::new(HashMap::new()),
            }
        }

        fn with(self, kind: ObjectKind, logical: &str, edge: &str, backend: &str) -> Self {
            self.bindings.lock().unwrap().insert(
                (kind, logical.to_string(), edge.to_string()),
                Binding::new(kind, logical, edge, backend),
            );
            self
        }
    }

    #[async_trait]
    impl BindingStore for MockBindingStore {
        async fn put(&self, binding: Binding) -> Result<()> {
            self.bindings.lock().unwrap().insert(
                (
                    binding.kind,
                    binding.logical_id.clone(),
                    binding.instance_id.clone(),
                ),
                binding,
            );
            Ok(())
        }

        async fn get(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<Binding> {
            self.bindings
                .lock()
                .unwrap()
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
            self.bindings
                .lock()
                .unwrap()
                .values()
                .find(|b| b.kind == kind && b.instance_id == instance_id && b.backend_id == backend_id)
                .cloned()
                .ok_or_else(|| DriverError::BindingNotFound {
                    kind,
                    id: backend_id.to_string(),
                    instance: instance_id.to_string(),
                })
        }

        async fn delete(&self, kind: ObjectKind, logical_id: &str, instance_id: &str) -> Result<()> {
            self.bindings
                .lock()
                .unwrap()
                .remove(&(kind, logical_id.to_string(), instance_id.to_string()));
            Ok(())
        }
    }

    // ===== Test Helpers =====

    fn test_vip() -> Vip {
        Vip {
            id: "vip-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            name: "web-vip".to_string(),
            address: "10.0.0.10".to_string(),
            protocol: "HTTP".to_string(),
            protocol_port: 80,
            pool_id: "pool-1".to_string(),
            subnet_id: "subnet-1".to_string(),
            port_id: None,
            session_persistence: None,
        }
    }

    fn test_pool(lb_method: &str, monitors: &[&str]) -> Pool {
        Pool {
            id: "pool-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            name: "web-pool".to_string(),
            lb_method: lb_method.to_string(),
            protocol: "HTTP".to_string(),
            subnet_id: "subnet-1".to_string(),
            members: vec![
                Member {
                    id: "m-1".to_string(),
                    pool_id: "pool-1".to_string(),
                    address: "10.0.1.1".to_string(),
                    protocol_port: 8080,
                    weight: 1,
                },
                Member {
                    id: "m-2".to_string(),
                    pool_id: "pool-1".to_string(),
                    address: "10.0.1.2".to_string(),
                    protocol_port: 8081,
                    weight: 1,
                },
            ],
            health_monitors: monitors.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn test_monitor(monitor_type: &str) -> HealthMonitor {
        HealthMonitor {
            id: "hm-1".to_string(),
            tenant_id: "tenant-a".to_string(),
            monitor_type: monitor_type.to_string(),
            delay: 5,
            timeout: 3,
            max_retries: 2,
        }
    }

    // ===== VIP Tests =====

    #[tokio::test]
    async fn test_to_backend_vip_resolves_pool_binding() {
        let store = MockBindingStore::new().with(ObjectKind::Pool, "pool-1", "edge-1", "pool-7");
        let translator = Translator::new(Arc::new(store));

        let edge_vip = translator
            .to_backend_vip("edge-1", &test_vip(), Some("applicationProfile-3"))
            .await
            .unwrap();

        assert_eq!(edge_vip.ip_address, "10.0.0.10");
        assert_eq!(edge_vip.port, 80);
        assert_eq!(edge_vip.default_pool_id, "pool-7");
        assert_eq!(edge_vip.application_profile_id.as_deref(), Some("applicationProfile-3"));
    }

    #[tokio::test]
    async fn test_to_backend_vip_unbound_pool() {
        let store = MockBindingStore::new().with(ObjectKind::Pool, "pool-1", "edge-2", "pool-7");
        let translator = Translator::new(Arc::new(store));

        let err = translator
            .to_backend_vip("edge-1", &test_vip(), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DriverError::BindingNotFound { kind: ObjectKind::Pool, .. }
        ));
    }

    #[tokio::test]
    async fn test_vip_roundtrip_recovers_fields() {
        let store = MockBindingStore::new().with(ObjectKind::Pool, "pool-1", "edge-1", "pool-7");
        let translator = Translator::new(Arc::new(store));
        let vip = test_vip();

        let edge_vip = translator.to_backend_vip("edge-1", &vip, None).await.unwrap();
        let snapshot = translator.from_backend_vip("edge-1", &edge_vip).await.unwrap();

        assert_eq!(snapshot.address, vip.address);
        assert_eq!(snapshot.protocol, vip.protocol);
        assert_eq!(snapshot.protocol_port, vip.protocol_port);
        assert_eq!(snapshot.pool_id, vip.pool_id);
    }

    #[tokio::test]
    async fn test_from_backend_vip_without_reverse_binding() {
        let translator = Translator::new(Arc::new(MockBindingStore::new()));
        let edge_vip = EdgeVip {
            name: "orphan".to_string(),
            ip_address: "10.0.0.10".to_string(),
            protocol: "TCP".to_string(),
            port: 443,
            default_pool_id: "pool-99".to_string(),
            application_profile_id: None,
        };

        let err = translator.from_backend_vip("edge-1", &edge_vip).await.unwrap_err();
        assert!(matches!(err, DriverError::BindingNotFound { .. }));
    }

    // ===== Pool Tests =====

    #[tokio::test]
    async fn test_to_backend_pool_algorithms() {
        let translator = Translator::new(Arc::new(MockBindingStore::new()));
        let tests = vec![
            ("ROUND_ROBIN", "round-robin"),
            ("LEAST_CONNECTIONS", "leastconn"),
            ("SOURCE_IP", "source"),
            ("SOMETHING_ELSE", "round-robin"),
        ];

        for (lb_method, expected) in tests {
            let pool = test_pool(lb_method, &[]);
            let edge_pool = translator
                .to_backend_pool("edge-1", &pool, &pool.members)
                .await
                .unwrap();
            assert_eq!(edge_pool.algorithm, expected, "Failed for lb_method: {}", lb_method);
        }
    }

    #[tokio::test]
    async fn test_to_backend_pool_flattens_members_in_order() {
        let translator = Translator::new(Arc::new(MockBindingStore::new()));
        let pool = test_pool("ROUND_ROBIN", &[]);

        let edge_pool = translator
            .to_backend_pool("edge-1", &pool, &pool.members)
            .await
            .unwrap();

        assert_eq!(
            edge_pool.member,
            vec![
                EdgeMember {
                    ip_address: "10.0.1.1".to_string(),
                    port: 8080
                },
                EdgeMember {
                    ip_address: "10.0.1.2".to_string(),
                    port: 8081
                },
            ]
        );
        assert!(edge_pool.monitor_id.is_empty());
    }

    #[tokio::test]
    async fn test_to_backend_pool_keeps_only_first_monitor() {
        let store = MockBindingStore::new()
            .with(ObjectKind::HealthMonitor, "hm-1", "edge-1", "monitor-1")
            .with(ObjectKind::HealthMonitor, "hm-2", "edge-1", "monitor-2");
        let translator = Translator::new(Arc::new(store));
        let pool = test_pool("ROUND_ROBIN", &["hm-1", "hm-2"]);

        let edge_pool = translator
            .to_backend_pool("edge-1", &pool, &pool.members)
            .await
            .unwrap();

        assert_eq!(edge_pool.monitor_id, vec!["monitor-1".to_string()]);
    }

    #[tokio::test]
    async fn test_to_backend_pool_unbound_monitor() {
        let translator = Translator::new(Arc::new(MockBindingStore::new()));
        let pool = test_pool("ROUND_ROBIN", &["hm-1"]);

        let err = translator
            .to_backend_pool("edge-1", &pool, &pool.members)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DriverError::BindingNotFound { kind: ObjectKind::HealthMonitor, .. }
        ));
    }

    #[test]
    fn test_from_backend_pool() {
        let edge_pool = EdgePool {
            name: "web-pool".to_string(),
            algorithm: "leastconn".to_string(),
            member: Vec::new(),
            monitor_id: Vec::new(),
        };
        assert_eq!(Translator::from_backend_pool(&edge_pool).name, "web-pool");
    }

    // ===== Monitor Tests =====

    #[test]
    fn test_to_backend_monitor_types() {
        let tests = vec![
            ("TCP", "tcp"),
            ("HTTP", "http"),
            ("HTTPS", "tcp"),
            ("PING", "http"),
        ];

        for (monitor_type, expected) in tests {
            let edge = Translator::to_backend_monitor(&test_monitor(monitor_type));
            assert_eq!(edge.monitor_type, expected, "Failed for type: {}", monitor_type);
        }
    }

    #[test]
    fn test_to_backend_monitor_fields() {
        let edge = Translator::to_backend_monitor(&test_monitor("HTTP"));

        assert_eq!(edge.interval, 5);
        assert_eq!(edge.timeout, 3);
        assert_eq!(edge.max_retries, 2);
        assert_eq!(edge.name, "hm-1");
    }

    #[test]
    fn test_monitor_roundtrip() {
        let monitor = test_monitor("TCP");
        let snapshot = Translator::from_backend_monitor(&Translator::to_backend_monitor(&monitor));

        assert_eq!(snapshot.id, monitor.id);
        assert_eq!(snapshot.delay, monitor.delay);
        assert_eq!(snapshot.timeout, monitor.timeout);
        assert_eq!(snapshot.max_retries, monitor.max_retries);
    }

    // ===== App Profile Tests =====

    #[test]
    fn test_app_profile_ignores_requested_persistence() {
        let cookie = SessionPersistence {
            persistence_type: "APP_COOKIE".to_string(),
            cookie_name: Some("JSESSIONID".to_string()),
        };

        let with = Translator::to_app_profile("web-vip", Some(&cookie));
        let without = Translator::to_app_profile("web-vip", None);

        assert_eq!(with, without);
        assert_eq!(with.name, "web-vip");
        assert_eq!(with.persistence.method, "sourceip");
        assert_eq!(with.template, "HTTP");
        assert!(!with.insert_x_forwarded_for);
    }
}
