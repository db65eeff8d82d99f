//! Channel Messenger
//!
//! Implements Messenger with one tokio mpsc queue per topic. An agent (or a
//! test) subscribes to its topic and drains the receiver. A cast never
//! waits: casts to a topic nobody listens on, or to a full queue, are
//! dropped with a warning.

use crate::domain::ports::{AgentMessage, Messenger};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

const DEFAULT_QUEUE_DEPTH: usize = 1024;

pub struct ChannelMessenger {
    queues: Arc<DashMap<String, mpsc::Sender<AgentMessage>>>,
    depth: usize,
}

impl ChannelMessenger {
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_QUEUE_DEPTH)
    }

    pub fn with_depth(depth: usize) -> Self {
        Self {
            queues: Arc::new(DashMap::new()),
            depth,
        }
    }

    /// Open the queue for `topic`. A new subscription replaces the old one.
    pub fn subscribe(&self, topic: &str) -> mpsc::Receiver<AgentMessage> {
        let (tx, rx) = mpsc::channel(self.depth);
        self.queues.insert(topic.to_string(), tx);
        tracing::debug!("subscribed to topic {}", topic);
        rx
    }
}

impl Default for ChannelMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for ChannelMessenger {
    async fn cast(&self, topic: &str, message: AgentMessage) {
        let sender = self.queues.get(topic).map(|e| e.value().clone());

        let Some(sender) = sender else {
            tracing::warn!("no consumer on topic {}, dropping {}", topic, message.method);
            return;
        };

        match sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::warn!("queue for topic {} is full, dropping {}", topic, message.method);
            }
            Err(TrySendError::Closed(message)) => {
                tracing::warn!(
                    "consumer on topic {} went away, dropping {}",
                    topic,
                    message.method
                );
                self.queues.remove(topic);
            }
        }
    }
}
