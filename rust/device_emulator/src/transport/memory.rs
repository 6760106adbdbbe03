use super::{InboundMessage, Transport};
use crate::error::{EmulatorError, Result};
use async_trait::async_trait;
use flume::{Receiver, Sender};
use std::collections::HashSet;
use tokio::sync::Mutex;

/// In-process transport: records publications and only delivers injected
/// messages whose topic has been subscribed.
pub struct MemoryTransport {
    published: Mutex<Vec<(String, String)>>,
    subscriptions: Mutex<HashSet<String>>,
    fail_subscriptions: Mutex<bool>,
    tx: Sender<InboundMessage>,
    rx: Receiver<InboundMessage>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            published: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(HashSet::new()),
            fail_subscriptions: Mutex::new(false),
            tx,
            rx,
        }
    }

    /// Makes every later `subscribe` call fail.
    pub async fn fail_subscriptions(&self, fail: bool) {
        *self.fail_subscriptions.lock().await = fail;
    }

    pub async fn published(&self) -> Vec<(String, String)> {
        self.published.lock().await.clone()
    }

    pub async fn published_to(&self, topic: &str) -> Vec<String> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub async fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.lock().await.contains(topic)
    }

    /// Queues an inbound message. Returns `false` when nobody subscribed to `topic`.
    pub async fn inject(&self, topic: &str, payload: &[u8]) -> bool {
        if !self.is_subscribed(topic).await {
            return false;
        }
        self.tx
            .send(InboundMessage::new(topic, payload.to_vec()))
            .is_ok()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        self.published
            .lock()
            .await
            .push((topic.to_string(), payload));
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<()> {
        if *self.fail_subscriptions.lock().await {
            return Err(EmulatorError::Connection(format!(
                "Subscription refused for {}",
                topic
            )));
        }
        self.subscriptions.lock().await.insert(topic.to_string());
        Ok(())
    }

    fn messages(&self) -> Receiver<InboundMessage> {
        self.rx.clone()
    }
}
