//! Messenger Port
//!
//! One-way message delivery to an agent's queue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A remote method invocation sent to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub method: String,
    pub version: String,
    pub args: serde_json::Value,
}

/// Fire-and-forget transport.
///
/// `cast` returns once the message is handed to the transport. There is no
/// reply and no delivery guarantee surfaced to the caller.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn cast(&self, topic: &str, message: AgentMessage);
}
