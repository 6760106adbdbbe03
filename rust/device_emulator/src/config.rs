//! Emulator configuration: device layout, sensors, simulators and transport.

use crate::error::{EmulatorError, Result};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmulatorConfig {
    #[serde(default, alias = "mqtt")]
    pub transport: TransportConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransportConfig {
    /// `client` or `peer`; zenoh's default when absent.
    pub mode: Option<String>,
    #[serde(default)]
    pub connect: Vec<String>,
    #[serde(default)]
    pub listen: Vec<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Milliseconds.
    #[serde(rename = "connectTimeout", alias = "connect_timeout")]
    pub connect_timeout: Option<u64>,
    #[serde(rename = "pubTopicPrefix")]
    pub pub_topic_prefix: Option<String>,
    #[serde(rename = "subTopicPrefix")]
    pub sub_topic_prefix: Option<String>,
}

impl TransportConfig {
    /// Endpoints to connect to: the explicit list, or one built from host/port.
    pub fn endpoints(&self) -> Vec<String> {
        if !self.connect.is_empty() {
            return self.connect.clone();
        }
        match &self.host {
            Some(host) => vec![format!("tcp/{}:{}", host, self.port.unwrap_or(7447))],
            None => Vec::new(),
        }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout.map(Duration::from_millis)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TopicPrefix {
    pub publish: Option<String>,
    pub subscribe: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeviceConfig {
    /// Default tick interval in milliseconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(rename = "topicPrefix", alias = "topic_prefix", default)]
    pub topic_prefix: TopicPrefix,
    #[serde(default, deserialize_with = "ordered_sensors")]
    pub sensors: Vec<(String, SensorConfig)>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            topic_prefix: TopicPrefix::default(),
            sensors: Vec::new(),
        }
    }
}

fn default_interval() -> u64 {
    1
}

fn default_enabled() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Per-sensor interval override in milliseconds.
    pub interval: Option<u64>,
    pub simulator: Option<SimulatorConfig>,
    #[serde(flatten)]
    pub custom_config: serde_json::Map<String, serde_json::Value>,
}

impl SensorConfig {
    /// Deserializes the type-specific fields of this sensor.
    pub fn params<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::Value::Object(self.custom_config.clone());
        serde_json::from_value(value).map_err(EmulatorError::from)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(rename = "type")]
    pub simulator_type: String,
    /// Fixes the random sequence of stochastic simulators.
    pub seed: Option<u64>,
    #[serde(flatten)]
    pub custom_config: serde_json::Map<String, serde_json::Value>,
}

impl SimulatorConfig {
    pub fn new(simulator_type: &str, custom_config: serde_json::Value) -> Self {
        let custom_config = match custom_config {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            simulator_type: simulator_type.to_string(),
            seed: None,
            custom_config,
        }
    }

    pub fn params<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::Value::Object(self.custom_config.clone());
        serde_json::from_value(value).map_err(EmulatorError::from)
    }
}

impl EmulatorConfig {
    /// Publish and subscribe prefixes, device settings first.
    pub fn topic_prefixes(&self) -> (String, String) {
        let publish = self
            .device
            .topic_prefix
            .publish
            .clone()
            .or_else(|| self.transport.pub_topic_prefix.clone())
            .unwrap_or_default();
        let subscribe = self
            .device
            .topic_prefix
            .subscribe
            .clone()
            .or_else(|| self.transport.sub_topic_prefix.clone())
            .unwrap_or_default();
        (publish, subscribe)
    }

    /// Tick interval for one sensor; never zero.
    pub fn interval_for(&self, sensor: &SensorConfig) -> Duration {
        let millis = sensor.interval.unwrap_or(self.device.interval).max(1);
        Duration::from_millis(millis)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(EmulatorError::from)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(EmulatorError::from)
    }
}

/// Resolves a config file name against the config directory, appending
/// `.json` when the name carries no known extension.
pub fn resolve_config_path(config_dir: &Path, config_file: &str) -> PathBuf {
    let mut path = if Path::new(config_file).is_absolute() {
        PathBuf::from(config_file)
    } else {
        config_dir.join(config_file)
    };
    let known = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    );
    if !known {
        let mut name = path.clone().into_os_string();
        name.push(".json");
        path = PathBuf::from(name);
    }
    path
}

pub fn load_config(path: &Path) -> Result<EmulatorConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        EmulatorError::Config(format!("Could not read {}: {}", path.display(), e))
    })?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => EmulatorConfig::from_yaml(&text),
        _ => EmulatorConfig::from_json(&text),
    };
    parsed.map_err(|e| {
        EmulatorError::Config(format!("Could not parse {}: {}", path.display(), e))
    })
}

fn ordered_sensors<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, SensorConfig)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SensorsVisitor;

    impl<'de> Visitor<'de> for SensorsVisitor {
        type Value = Vec<(String, SensorConfig)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of sensor name to sensor configuration")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut sensors: Vec<(String, SensorConfig)> =
                Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, config)) = map.next_entry::<String, SensorConfig>()? {
                if sensors.iter().any(|(n, _)| *n == name) {
                    return Err(de::Error::custom(format!("duplicate sensor `{}`", name)));
                }
                sensors.push((name, config));
            }
            Ok(sensors)
        }
    }

    deserializer.deserialize_map(SensorsVisitor)
}
