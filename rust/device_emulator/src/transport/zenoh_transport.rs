use super::{InboundMessage, Transport};
use crate::config::TransportConfig;
use crate::error::{EmulatorError, Result};
use async_trait::async_trait;
use flume::{Receiver, Sender};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use zenoh::config::whatami::WhatAmI;
use zenoh::config::EndPoint;
use zenoh::prelude::r#async::*;
use zenoh::subscriber::Subscriber;

pub struct ZenohTransport {
    session: Arc<Session>,
    subscribers: Mutex<HashMap<String, Subscriber<'static, ()>>>,
    tx: Sender<InboundMessage>,
    rx: Receiver<InboundMessage>,
}

impl ZenohTransport {
    pub async fn connect(config: &TransportConfig) -> Result<Self> {
        let zenoh_config = build_zenoh_config(config)?;
        let open = zenoh::open(zenoh_config).res();
        let opened = match config.connect_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, open).await.map_err(|_| {
                EmulatorError::Connection(format!("Connect timed out after {:?}", timeout))
            })?,
            None => open.await,
        };
        let session = opened.map_err(|e| EmulatorError::Connection(e.to_string()))?;
        info!("Zenoh session opened");
        Ok(Self::from_session(session.into_arc()))
    }

    pub fn from_session(session: Arc<Session>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            session,
            subscribers: Mutex::new(HashMap::new()),
            tx,
            rx,
        }
    }

    pub fn session(&self) -> Arc<Session> {
        self.session.clone()
    }
}

fn build_zenoh_config(config: &TransportConfig) -> Result<zenoh::config::Config> {
    let mut zenoh_config = zenoh::config::Config::default();
    if let Some(mode) = &config.mode {
        let whatami = match mode.as_str() {
            "client" => WhatAmI::Client,
            "peer" => WhatAmI::Peer,
            "router" => WhatAmI::Router,
            other => {
                return Err(EmulatorError::Config(format!(
                    "Unknown transport mode: {}",
                    other
                )))
            }
        };
        zenoh_config
            .set_mode(Some(whatami))
            .map_err(|e| EmulatorError::Config(format!("Invalid mode {}: {:?}", mode, e)))?;
    }
    for endpoint in config.endpoints() {
        let parsed = endpoint.parse::<EndPoint>().map_err(|e| {
            EmulatorError::Config(format!("Invalid endpoint {}: {}", endpoint, e))
        })?;
        zenoh_config.connect.endpoints.push(parsed);
    }
    for endpoint in &config.listen {
        let parsed = endpoint.parse::<EndPoint>().map_err(|e| {
            EmulatorError::Config(format!("Invalid listen endpoint {}: {}", endpoint, e))
        })?;
        zenoh_config.listen.endpoints.push(parsed);
    }
    Ok(zenoh_config)
}

#[async_trait]
impl Transport for ZenohTransport {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        self.session.put(topic, payload).res().await?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<()> {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.contains_key(topic) {
            debug!("Already subscribed to {}", topic);
            return Ok(());
        }

        let tx = self.tx.clone();
        let subscriber = self
            .session
            .declare_subscriber(topic)
            .callback(move |sample: Sample| {
                let message = InboundMessage {
                    topic: sample.key_expr.as_str().to_string(),
                    payload: sample.value.payload.contiguous().to_vec(),
                };
                if tx.send(message).is_err() {
                    warn!("Inbound channel closed, dropping sample");
                }
            })
            .res()
            .await
            .map_err(|e| EmulatorError::Connection(format!("Subscribe to {}: {}", topic, e)))?;

        subscribers.insert(topic.to_string(), subscriber);
        debug!("Subscribed to {}", topic);
        Ok(())
    }

    fn messages(&self) -> Receiver<InboundMessage> {
        self.rx.clone()
    }
}
