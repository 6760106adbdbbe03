use super::SensorStatus;
use crate::config::EmulatorConfig;
use crate::error::{EmulatorError, Result};
use crate::plugins::SensorRegistry;
use crate::sensor::{SensorContext, SensorNode};
use crate::simulator::SimulatorRegistry;
use crate::transport::{InboundMessage, Transport, ZenohTransport};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A device made of configured sensors sharing one transport.
pub struct DeviceEmulator {
    sensors: Vec<SensorNode>,
    transport: Arc<dyn Transport>,
}

impl DeviceEmulator {
    /// Opens a zenoh session from the transport settings and starts every
    /// enabled sensor with the built-in sensor and simulator types.
    pub async fn launch(config: &EmulatorConfig) -> Result<Self> {
        let transport = ZenohTransport::connect(&config.transport).await?;
        Self::start(
            config,
            Arc::new(transport),
            &SensorRegistry::new(),
            &SimulatorRegistry::new(),
        )
        .await
    }

    /// Builds and starts sensors in configuration order. Disabled entries and
    /// entries that cannot be built are skipped; failing to start any sensor
    /// at all is an error.
    pub async fn start(
        config: &EmulatorConfig,
        transport: Arc<dyn Transport>,
        sensors: &SensorRegistry,
        simulators: &SimulatorRegistry,
    ) -> Result<Self> {
        let (publish_prefix, subscribe_prefix) = config.topic_prefixes();
        let mut nodes = Vec::new();

        for (name, sensor_config) in &config.device.sensors {
            if !sensor_config.enabled {
                debug!("Sensor {} is disabled", name);
                continue;
            }
            let sensor_type = sensor_config.sensor_type.as_deref().unwrap_or(name.as_str());
            let context = SensorContext {
                name,
                config: sensor_config,
                interval: config.interval_for(sensor_config),
                publish_prefix: &publish_prefix,
                subscribe_prefix: &subscribe_prefix,
                simulators,
            };
            let Some(sensor) = sensors.create_sensor(sensor_type, &context) else {
                warn!("Skipping sensor {}", name);
                continue;
            };
            let node = SensorNode::new(sensor, transport.clone());
            node.start().await;
            nodes.push(node);
        }

        if nodes.is_empty() {
            error!("No sensors started");
            return Err(EmulatorError::NoSensorsStarted);
        }
        info!("Device emulator started with {} sensor(s)", nodes.len());

        Ok(Self {
            sensors: nodes,
            transport,
        })
    }

    pub fn sensors(&self) -> &[SensorNode] {
        &self.sensors
    }

    pub fn sensor(&self, name: &str) -> Option<&SensorNode> {
        self.sensors.iter().find(|s| s.name() == name)
    }

    pub async fn status(&self) -> Vec<SensorStatus> {
        let mut status = Vec::with_capacity(self.sensors.len());
        for node in &self.sensors {
            status.push(SensorStatus {
                name: node.name().to_string(),
                sensor_type: node.sensor_type(),
                publish_topic: node.topics().publish.clone(),
                subscribe_topic: node.topics().subscribe.clone(),
                value: node.value().await,
                running: node.is_running().await,
            });
        }
        status
    }

    /// Forwards a message to every sensor that handles its topic and returns
    /// how many did.
    pub async fn dispatch(&self, message: &InboundMessage) -> usize {
        let mut handled = 0;
        for node in &self.sensors {
            if node.is_handled_topic(&message.topic) {
                node.handle_topic(&message.topic, &message.payload).await;
                handled += 1;
            }
        }
        if handled == 0 {
            debug!("No sensor handles topic {}", message.topic);
        }
        handled
    }

    /// Dispatches inbound messages until cancelled or the transport closes.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let messages = self.transport.messages();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Device emulator shutting down");
                    break;
                }
                received = messages.recv_async() => match received {
                    Ok(message) => {
                        self.dispatch(&message).await;
                    }
                    Err(_) => {
                        warn!("Inbound message stream closed");
                        break;
                    }
                },
            }
        }
        Ok(())
    }

    /// Stops every sensor.
    pub async fn shutdown(&self) {
        for node in &self.sensors {
            node.stop().await;
        }
    }
}
