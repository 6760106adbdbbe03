//! Publish/subscribe transport used for telemetry and commands.

mod memory;
mod zenoh_transport;

pub use memory::MemoryTransport;
pub use zenoh_transport::ZenohTransport;

use crate::error::Result;
use async_trait::async_trait;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, topic: &str, payload: String) -> Result<()>;

    /// Starts delivering messages for `topic` to the inbound stream.
    async fn subscribe(&self, topic: &str) -> Result<()>;

    /// Inbound messages for every subscribed topic.
    fn messages(&self) -> flume::Receiver<InboundMessage>;
}
