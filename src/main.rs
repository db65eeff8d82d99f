//! lbaas-driver - Load balancer drivers with hexagonal architecture
//!
//! This is the composition root that wires together all the components.

mod adapters;
mod application;
mod config;
mod domain;

use crate::adapters::inbound::CallbackApi;
use crate::adapters::outbound::{
    ChanceScheduler, ChannelMessenger, DashMapLbRepository, NeutronNetworkClient, RestClient,
    SqliteBindingStore, VcnsEdgeGateway,
};
use crate::application::{AgentCallbacks, AgentLoadBalancerDriver, EdgeLoadBalancerDriver};
use crate::config::{load_config, SchedulerKind};
use crate::domain::ports::PoolScheduler;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting lbaas-driver edge={} network={} callbacks={}",
        cfg.edge_api_url,
        cfg.network_api_url,
        cfg.callback_listen_addr
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters

    // Edge appliance manager (REST) and its durable bindings (SQLite)
    let edge_gateway = Arc::new(VcnsEdgeGateway::new(RestClient::new(cfg.edge_client_config())?));
    let bindings = Arc::new(SqliteBindingStore::open(&cfg.binding_db_path)?);
    tracing::info!("edge bindings stored in {}", cfg.binding_db_path);

    // Networking service (REST)
    let network = Arc::new(NeutronNetworkClient::new(RestClient::new(
        cfg.network_client_config(),
    )?));

    // Load balancer records and agent hosting (DashMap)
    let repository = Arc::new(DashMapLbRepository::new());

    let scheduler: Arc<dyn PoolScheduler> = match cfg.scheduler_kind()? {
        SchedulerKind::Chance => Arc::new(ChanceScheduler::new(repository.clone())),
    };

    // Agent casts (tokio channels)
    let messenger = Arc::new(ChannelMessenger::new());

    // 2. Application services
    // The drivers are library entry points the platform embeds through
    // lbaas_driver; the binary only builds them to check the wiring and
    // serves the agent callbacks.
    let _edge_driver = EdgeLoadBalancerDriver::new(edge_gateway, bindings);
    let agent_driver = AgentLoadBalancerDriver::new(
        cfg.agent_driver_config(),
        repository.clone(),
        network.clone(),
        scheduler,
        messenger,
    );
    let callbacks = Arc::new(AgentCallbacks::new(network, repository));

    tracing::info!(
        "agent driver casting on {}, device topic {}, snat mode {:?}",
        agent_driver.config().agent_topic,
        agent_driver.config().device_topic,
        agent_driver.snat_ports().mode()
    );

    // 3. Inbound adapter
    let api = CallbackApi::new(cfg.callback_listen_addr, callbacks);
    api.run().await
}
