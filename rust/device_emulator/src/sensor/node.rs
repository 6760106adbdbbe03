use super::interface::{SensorInterface, SensorTopics};
use crate::error::Result;
use crate::transport::Transport;
use crate::wire::encode_value;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Runs one sensor against the transport: a periodic publish loop plus the
/// command path. Ticks and commands for the same sensor never interleave.
pub struct SensorNode {
    name: String,
    sensor_type: &'static str,
    topics: SensorTopics,
    interval: Duration,
    sensor: Arc<Mutex<Box<dyn SensorInterface>>>,
    transport: Arc<dyn Transport>,
    timer: Mutex<Option<CancellationToken>>,
}

impl SensorNode {
    pub fn new(sensor: Box<dyn SensorInterface>, transport: Arc<dyn Transport>) -> Self {
        let name = sensor.core().name().to_string();
        let topics = sensor.core().topics().clone();
        let interval = sensor.core().interval();
        Self {
            name,
            sensor_type: sensor.get_type(),
            topics,
            interval,
            sensor: Arc::new(Mutex::new(sensor)),
            transport,
            timer: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> &'static str {
        self.sensor_type
    }

    pub fn topics(&self) -> &SensorTopics {
        &self.topics
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts publishing every interval and subscribes to the command topic.
    /// Calling it again replaces the running timer.
    pub async fn start(&self) {
        info!("Starting {} sensor {}", self.sensor_type, self.name);

        let cancel = CancellationToken::new();
        if let Some(previous) = self.timer.lock().await.replace(cancel.clone()) {
            previous.cancel();
        }

        let name = self.name.clone();
        let topic = self.topics.publish.clone();
        let sensor = self.sensor.clone();
        let transport = self.transport.clone();
        let period = self.interval;
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("[{}] Loop timer cancelled", name);
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = publish_tick(&name, &sensor, transport.as_ref(), &topic).await {
                            error!("[{}] Publish to {} failed: {}", name, topic, e);
                        }
                    }
                }
            }
        });

        if let Err(e) = self.transport.subscribe(&self.topics.subscribe).await {
            error!(
                "{} subscription failed for topic: {}, with error: {}",
                self.name, self.topics.subscribe, e
            );
        }
    }

    /// Cancels the timer and puts the value back on its start value.
    pub async fn stop(&self) {
        if let Some(timer) = self.timer.lock().await.take() {
            timer.cancel();
            info!("Stopped sensor {}", self.name);
        }
        self.sensor.lock().await.reset();
    }

    pub async fn is_running(&self) -> bool {
        self.timer.lock().await.is_some()
    }

    /// Runs a single tick immediately: publish the current value, then advance.
    pub async fn loop_once(&self) -> Result<()> {
        publish_tick(
            &self.name,
            &self.sensor,
            self.transport.as_ref(),
            &self.topics.publish,
        )
        .await
    }

    pub fn is_handled_topic(&self, topic: &str) -> bool {
        topic == self.topics.subscribe
    }

    /// Applies an inbound command. Rejections and foreign topics are logged and
    /// leave the state alone.
    pub async fn handle_topic(&self, topic: &str, payload: &[u8]) {
        if !self.is_handled_topic(topic) {
            debug!("[{}] Ignoring message on {}", self.name, topic);
            return;
        }
        debug!(
            "[{}] Command on {}: {}",
            self.name,
            topic,
            String::from_utf8_lossy(payload)
        );
        let mut sensor = self.sensor.lock().await;
        if let Err(e) = sensor.handle_topic(topic, payload) {
            error!("[{}] {}", self.name, e);
        }
    }

    pub async fn value(&self) -> f64 {
        self.sensor.lock().await.core().value()
    }

    /// Runs `f` with the sensor locked.
    pub async fn inspect<R>(&self, f: impl FnOnce(&dyn SensorInterface) -> R) -> R {
        let sensor = self.sensor.lock().await;
        f(&**sensor)
    }
}

impl Drop for SensorNode {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.cancel();
        }
    }
}

async fn publish_tick(
    name: &str,
    sensor: &Mutex<Box<dyn SensorInterface>>,
    transport: &dyn Transport,
    topic: &str,
) -> Result<()> {
    let value = sensor.lock().await.loop_tick();
    let payload = encode_value(value);
    info!("[{}] Publishing {} to topic: {}", name, payload, topic);
    transport.publish(topic, payload).await
}
