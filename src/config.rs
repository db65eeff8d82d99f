use crate::adapters::outbound::{BodyFormat, RestClientConfig};
use crate::application::{AgentDriverConfig, TOPIC_LOADBALANCER_AGENT, TOPIC_LOADBALANCER_DEVICE};
use crate::domain::error::{DriverError, Result};
use crate::domain::value_objects::SnatMode;
use serde::Deserialize;
use std::collections::HashMap;

/// Pool scheduling strategy selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    Chance,
}

impl SchedulerKind {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "chance" => Ok(Self::Chance),
            other => Err(DriverError::Configuration(format!(
                "unknown pool scheduler: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Edge appliance manager
    pub edge_api_url: String,
    pub edge_api_user: Option<String>,
    pub edge_api_password: Option<String>,
    pub edge_timeout_secs: u64,

    // Networking service
    pub network_api_url: String,
    pub network_api_token: Option<String>,

    // Edge binding storage
    pub binding_db_path: String,

    // Agent messaging
    pub agent_topic: String,
    pub device_topic: String,
    pub pool_scheduler: String,
    pub snat_locking: bool,

    // Agent callback API
    pub callback_listen_addr: String,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edge_api_url: "https://127.0.0.1".to_string(),
            edge_api_user: None,
            edge_api_password: None,
            edge_timeout_secs: 30,
            network_api_url: "http://127.0.0.1:9696".to_string(),
            network_api_token: None,
            binding_db_path: "edge_bindings.db".to_string(),
            agent_topic: TOPIC_LOADBALANCER_AGENT.to_string(),
            device_topic: TOPIC_LOADBALANCER_DEVICE.to_string(),
            pool_scheduler: "chance".to_string(),
            snat_locking: false,
            callback_listen_addr: "0.0.0.0:9697".to_string(),
            debug: false,
        }
    }
}

impl Config {
    pub fn snat_mode(&self) -> SnatMode {
        if self.snat_locking {
            SnatMode::PerSubnetLock
        } else {
            SnatMode::Unlocked
        }
    }

    pub fn scheduler_kind(&self) -> Result<SchedulerKind> {
        SchedulerKind::parse(&self.pool_scheduler)
    }

    pub fn agent_driver_config(&self) -> AgentDriverConfig {
        AgentDriverConfig {
            agent_topic: self.agent_topic.clone(),
            device_topic: self.device_topic.clone(),
            snat_mode: self.snat_mode(),
        }
    }

    pub fn edge_client_config(&self) -> RestClientConfig {
        RestClientConfig {
            uri: self.edge_api_url.clone(),
            username: self.edge_api_user.clone(),
            password: self.edge_api_password.clone(),
            format: BodyFormat::Json,
            timeout_secs: self.edge_timeout_secs,
            ..Default::default()
        }
    }

    /// Keystone token, when given, goes in `X-Auth-Token`.
    pub fn network_client_config(&self) -> RestClientConfig {
        let mut headers = HashMap::new();
        if let Some(token) = &self.network_api_token {
            headers.insert("X-Auth-Token".to_string(), token.clone());
        }
        RestClientConfig {
            uri: self.network_api_url.clone(),
            format: BodyFormat::Json,
            headers,
            ..Default::default()
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

pub fn load_config() -> anyhow::Result<Config> {
    let defaults = Config::default();

    let edge_api_url =
        std::env::var("LBDRIVER_EDGE_API_URL").unwrap_or(defaults.edge_api_url);
    let edge_api_user = std::env::var("LBDRIVER_EDGE_API_USER").ok();
    let edge_api_password = std::env::var("LBDRIVER_EDGE_API_PASSWORD").ok();

    let edge_timeout_secs = std::env::var("LBDRIVER_EDGE_TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(defaults.edge_timeout_secs);

    let network_api_url =
        std::env::var("LBDRIVER_NETWORK_API_URL").unwrap_or(defaults.network_api_url);
    let network_api_token = std::env::var("LBDRIVER_NETWORK_API_TOKEN").ok();

    let binding_db_path =
        std::env::var("LBDRIVER_BINDING_DB_PATH").unwrap_or(defaults.binding_db_path);

    let agent_topic = std::env::var("LBDRIVER_AGENT_TOPIC").unwrap_or(defaults.agent_topic);
    let device_topic = std::env::var("LBDRIVER_DEVICE_TOPIC").unwrap_or(defaults.device_topic);
    let pool_scheduler =
        std::env::var("LBDRIVER_POOL_SCHEDULER").unwrap_or(defaults.pool_scheduler);
    let snat_locking = env_flag("LBDRIVER_SNAT_LOCKING");

    let callback_listen_addr = std::env::var("LBDRIVER_CALLBACK_LISTEN_ADDR")
        .unwrap_or(defaults.callback_listen_addr);

    let debug = std::env::var("LBDRIVER_DEBUG").is_ok();

    Ok(Config {
        edge_api_url,
        edge_api_user,
        edge_api_password,
        edge_timeout_secs,
        network_api_url,
        network_api_token,
        binding_db_path,
        agent_topic,
        device_topic,
        pool_scheduler,
        snat_locking,
        callback_listen_addr,
        debug,
    })
}
