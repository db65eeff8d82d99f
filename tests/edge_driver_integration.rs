//! Edge driver integration tests
//!
//! Drives EdgeLoadBalancerDriver against a mocked edge management API
//! through the real REST client and a SQLite binding store.

use lbaas_driver::adapters::outbound::{RestClient, RestClientConfig, SqliteBindingStore, VcnsEdgeGateway};
use lbaas_driver::domain::entities::{Member, Pool, Vip};
use lbaas_driver::{BindingStore, DriverError, EdgeLoadBalancerDriver, ObjectKind};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONFIG: &str = "/api/4.0/edges/edge-1/loadbalancer/config";

fn driver_for(server: &MockServer, db_path: &Path) -> (Arc<SqliteBindingStore>, EdgeLoadBalancerDriver) {
    let client = RestClient::new(RestClientConfig {
        uri: server.uri(),
        username: Some("admin".to_string()),
        password: Some("default".to_string()),
        ..Default::default()
    })
    .unwrap();
    let bindings = Arc::new(SqliteBindingStore::open(db_path).unwrap());
    let driver = EdgeLoadBalancerDriver::new(Arc::new(VcnsEdgeGateway::new(client)), bindings.clone());
    (bindings, driver)
}

fn web_pool() -> (Pool, Vec<Member>) {
    let member = Member {
        id: "m1".to_string(),
        pool_id: "p1".to_string(),
        address: "10.0.0.5".to_string(),
        protocol_port: 8080,
        weight: 1,
    };
    let pool = Pool {
        id: "p1".to_string(),
        tenant_id: "tenant-a".to_string(),
        name: "web".to_string(),
        lb_method: "LEAST_CONNECTIONS".to_string(),
        protocol: "HTTP".to_string(),
        subnet_id: "subnet-1".to_string(),
        members: vec![member.clone()],
        health_monitors: Vec::new(),
    };
    (pool, vec![member])
}

fn web_vip() -> Vip {
    Vip {
        id: "v1".to_string(),
        tenant_id: "tenant-a".to_string(),
        name: "web-vip".to_string(),
        address: "192.168.1.10".to_string(),
        protocol: "HTTP".to_string(),
        protocol_port: 80,
        pool_id: "p1".to_string(),
        subnet_id: "subnet-1".to_string(),
        port_id: None,
        session_persistence: None,
    }
}

async fn mount_creates(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("{}/pools", CONFIG)))
        .and(body_partial_json(json!({"name": "web", "algorithm": "leastconn"})))
        .respond_with(
            ResponseTemplate::new(201).insert_header("location", format!("{}/pools/pool-1", CONFIG)),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/applicationprofiles", CONFIG)))
        .and(body_partial_json(json!({
            "name": "web-vip",
            "insertXForwardedFor": false,
            "persistence": {"method": "sourceip"},
            "template": "HTTP"
        })))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "location",
            format!("{}/applicationprofiles/applicationProfile-1", CONFIG),
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/virtualservers", CONFIG)))
        .and(body_partial_json(json!({
            "ipAddress": "192.168.1.10",
            "port": 80,
            "defaultPoolId": "pool-1",
            "applicationProfileId": "applicationProfile-1"
        })))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "location",
            format!("{}/virtualservers/virtualServer-1", CONFIG),
        ))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_pool_and_vip_records_bindings() {
    let mock_server = MockServer::start().await;
    mount_creates(&mock_server).await;
    let dir = tempfile::tempdir().unwrap();
    let (bindings, driver) = driver_for(&mock_server, &dir.path().join("bindings.db"));
    let (pool, members) = web_pool();

    let pool_binding = driver.create_pool("edge-1", &pool, &members).await.unwrap();
    let vip_binding = driver.create_vip("edge-1", &web_vip()).await.unwrap();

    assert_eq!(pool_binding.backend_id, "pool-1");
    assert_eq!(vip_binding.backend_id, "virtualServer-1");
    assert_eq!(vip_binding.extra.as_deref(), Some("applicationProfile-1"));

    let stored = bindings.get(ObjectKind::Vip, "v1", "edge-1").await.unwrap();
    assert_eq!(stored, vip_binding);
    let reverse = bindings
        .get_by_backend_id(ObjectKind::Pool, "edge-1", "pool-1")
        .await
        .unwrap();
    assert_eq!(reverse.logical_id, "p1");
}

#[tokio::test]
async fn test_bindings_survive_reopen() {
    let mock_server = MockServer::start().await;
    mount_creates(&mock_server).await;
    Mock::given(method("GET"))
        .and(path(format!("{}/virtualservers/virtualServer-1", CONFIG)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "web-vip",
            "ipAddress": "192.168.1.10",
            "protocol": "HTTP",
            "port": 80,
            "defaultPoolId": "pool-1",
            "applicationProfileId": "applicationProfile-1"
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("bindings.db");
    {
        let (_bindings, driver) = driver_for(&mock_server, &db_path);
        let (pool, members) = web_pool();
        driver.create_pool("edge-1", &pool, &members).await.unwrap();
        driver.create_vip("edge-1", &web_vip()).await.unwrap();
    }

    let (_bindings, driver) = driver_for(&mock_server, &db_path);
    let snapshot = driver.get_vip("edge-1", "v1").await.unwrap();

    assert_eq!(snapshot.pool_id, "p1");
    assert_eq!(snapshot.address, "192.168.1.10");
    assert_eq!(snapshot.protocol_port, 80);
}

#[tokio::test]
async fn test_delete_vip_keeps_binding_until_profile_is_gone() {
    let mock_server = MockServer::start().await;
    mount_creates(&mock_server).await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/virtualservers/virtualServer-1", CONFIG)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;
    // First profile delete fails, the retry succeeds
    Mock::given(method("DELETE"))
        .and(path(format!("{}/applicationprofiles/applicationProfile-1", CONFIG)))
        .respond_with(ResponseTemplate::new(500).set_body_string("edge busy"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/applicationprofiles/applicationProfile-1", CONFIG)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let (bindings, driver) = driver_for(&mock_server, &dir.path().join("bindings.db"));
    let (pool, members) = web_pool();
    driver.create_pool("edge-1", &pool, &members).await.unwrap();
    driver.create_vip("edge-1", &web_vip()).await.unwrap();

    let err = driver.delete_vip("edge-1", "v1").await.unwrap_err();
    assert!(matches!(err, DriverError::BackendRejected { status: 500, .. }));
    assert!(bindings.get(ObjectKind::Vip, "v1", "edge-1").await.is_ok());

    driver.delete_vip("edge-1", "v1").await.unwrap();
    assert!(matches!(
        bindings.get(ObjectKind::Vip, "v1", "edge-1").await,
        Err(DriverError::BindingNotFound { .. })
    ));
}

#[tokio::test]
async fn test_edge_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let client = RestClient::new(RestClientConfig {
        uri: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
        ..Default::default()
    })
    .unwrap();
    let bindings = Arc::new(SqliteBindingStore::open(dir.path().join("bindings.db")).unwrap());
    let driver = EdgeLoadBalancerDriver::new(Arc::new(VcnsEdgeGateway::new(client)), bindings.clone());
    let (pool, members) = web_pool();

    let err = driver.create_pool("edge-1", &pool, &members).await.unwrap_err();

    assert!(matches!(err, DriverError::BackendUnavailable { .. }));
    assert!(bindings.get(ObjectKind::Pool, "p1", "edge-1").await.is_err());
}
