use crate::config::{SensorConfig, SimulatorConfig};
use crate::error::{EmulatorError, Result};
use crate::simulator::{Simulator, SimulatorRegistry, SimulatorSeed};
use crate::wire::{build_topic, parse_command};
use log::warn;
use std::time::Duration;

pub trait SensorInterface: Send + Sync {
    fn core(&self) -> &SensorCore;
    fn core_mut(&mut self) -> &mut SensorCore;
    fn get_type(&self) -> &'static str;

    /// Returns the value to publish for this tick, then advances the simulation.
    fn loop_tick(&mut self) -> f64 {
        let current = self.core().value();
        self.core_mut().advance();
        current
    }

    /// Applies a command received on the subscribe topic. Any other topic is a
    /// no-op.
    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    fn is_handled_topic(&self, topic: &str) -> bool {
        self.core().topics().subscribe == topic
    }

    /// Puts the sensor back on its configured start value.
    fn reset(&mut self) {
        self.core_mut().reset();
    }
}

pub trait SensorFactory: Send + Sync {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorTopics {
    pub publish: String,
    pub subscribe: String,
}

impl SensorTopics {
    pub fn new(publish_prefix: &str, subscribe_prefix: &str, name: &str) -> Result<Self> {
        let topics = Self {
            publish: build_topic(publish_prefix, name),
            subscribe: build_topic(subscribe_prefix, name),
        };
        if topics.publish.is_empty() || topics.subscribe.is_empty() {
            return Err(EmulatorError::Config(format!(
                "Sensor `{}` resolves to an empty topic",
                name
            )));
        }
        Ok(topics)
    }
}

/// Everything a factory needs to build one sensor.
pub struct SensorContext<'a> {
    pub name: &'a str,
    pub config: &'a SensorConfig,
    pub interval: Duration,
    pub publish_prefix: &'a str,
    pub subscribe_prefix: &'a str,
    pub simulators: &'a SimulatorRegistry,
}

impl<'a> SensorContext<'a> {
    /// Builds the shared sensor state. The configured simulator wins over
    /// `fallback`; an unresolvable simulator leaves the sensor static.
    pub fn build_core(
        &self,
        start: f64,
        seed: SimulatorSeed,
        fallback: Option<SimulatorConfig>,
    ) -> Result<SensorCore> {
        let topics = SensorTopics::new(self.publish_prefix, self.subscribe_prefix, self.name)?;
        let simulator_config = self.config.simulator.clone().or(fallback);
        let simulator = match &simulator_config {
            Some(config) => {
                let simulator = self.simulators.create_simulator(seed, config);
                if simulator.is_none() {
                    warn!(
                        "[{}] No simulator '{}', publishing a static value",
                        self.name, config.simulator_type
                    );
                }
                simulator
            }
            None => None,
        };
        Ok(SensorCore {
            name: self.name.to_string(),
            topics,
            interval: self.interval,
            start,
            value: start,
            simulator,
        })
    }
}

/// State shared by every sensor variant.
pub struct SensorCore {
    name: String,
    topics: SensorTopics,
    interval: Duration,
    start: f64,
    value: f64,
    simulator: Option<Box<dyn Simulator>>,
}

impl SensorCore {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topics(&self) -> &SensorTopics {
        &self.topics
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn start_value(&self) -> f64 {
        self.start
    }

    pub fn simulator(&self) -> Option<&dyn Simulator> {
        self.simulator.as_deref()
    }

    pub fn simulator_mut(&mut self) -> Option<&mut (dyn Simulator + 'static)> {
        self.simulator.as_deref_mut()
    }

    /// Runs one simulator update and commits it. Without a simulator the value
    /// never moves.
    pub fn advance(&mut self) -> f64 {
        if let Some(simulator) = self.simulator.as_mut() {
            self.value = simulator.update();
        }
        self.value
    }

    /// Sets the published value only.
    pub fn commit(&mut self, value: f64) {
        self.value = value;
    }

    /// Sets the published value and moves the simulator along with it.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        if let Some(simulator) = self.simulator.as_mut() {
            simulator.set_value(value);
        }
    }

    pub fn reset(&mut self) {
        self.set_value(self.start);
    }

    pub fn accepts(&self, value: f64) -> bool {
        self.simulator.as_ref().map_or(true, |s| s.valid(value))
    }

    pub fn invalid_command(&self, payload: &[u8], reason: &str) -> EmulatorError {
        EmulatorError::InvalidCommand {
            sensor: self.name.clone(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            reason: reason.to_string(),
        }
    }

    /// Parses, coerces and validates a commanded value without applying it.
    pub fn check_command(
        &self,
        payload: &[u8],
        coerce: impl Fn(f64) -> f64,
        bounds: Option<(f64, f64)>,
    ) -> Result<f64> {
        let parsed = parse_command(payload)
            .ok_or_else(|| self.invalid_command(payload, "not an integer"))?;
        let value = coerce(parsed);
        if !self.accepts(value) {
            return Err(self.invalid_command(payload, "rejected by simulator"));
        }
        if let Some((min, max)) = bounds {
            if value < min || value > max {
                return Err(self.invalid_command(payload, "out of range"));
            }
        }
        Ok(value)
    }

    /// Validates a commanded value and, when accepted, commits it to the sensor
    /// and its simulator.
    pub fn apply_command(
        &mut self,
        payload: &[u8],
        coerce: impl Fn(f64) -> f64,
        bounds: Option<(f64, f64)>,
    ) -> Result<f64> {
        let value = self.check_command(payload, coerce, bounds)?;
        self.set_value(value);
        Ok(value)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topics() {
        let topics = SensorTopics::new("devices/d1/", "/devices//d1/cmd", "speed").unwrap();
        assert_eq!(topics.publish, "devices/d1/speed");
        assert_eq!(topics.subscribe, "devices/d1/cmd/speed");
        assert!(SensorTopics::new("", "", "").is_err());
    }

    #[test]
    fn test_core_without_simulator_is_static() {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(json!({ "type": "speed" }));
        let ctx = context("speed", &config, &simulators);
        let mut core = ctx.build_core(4.0, SimulatorSeed::new(4.0), None).unwrap();
        assert!(core.simulator().is_none());
        assert_eq!(core.advance(), 4.0);
        assert!(core.accepts(1e9));
    }

    #[test]
    fn test_unknown_simulator_falls_back_to_static() {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(json!({ "simulator": { "type": "sine" } }));
        let ctx = context("speed", &config, &simulators);
        let mut core = ctx.build_core(2.0, SimulatorSeed::new(2.0), None).unwrap();
        assert!(core.simulator().is_none());
        assert_eq!(core.advance(), 2.0);
    }

    #[test]
    fn test_configured_simulator_wins_over_fallback() {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(json!({ "simulator": { "type": "static" } }));
        let ctx = context("speed", &config, &simulators);
        let fallback = SimulatorConfig::new(
            "stair",
            json!({ "step_interval": 1, "min": 0, "max": 10 }),
        );
        let core = ctx
            .build_core(0.0, SimulatorSeed::new(0.0), Some(fallback))
            .unwrap();
        assert_eq!(core.simulator().unwrap().get_type(), "static");
    }

    #[test]
    fn test_apply_command() {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(json!({
            "simulator": { "type": "random", "min": 0, "max": 10 }
        }));
        let ctx = context("speed", &config, &simulators);
        let mut core = ctx.build_core(5.0, SimulatorSeed::new(5.0), None).unwrap();

        assert_eq!(core.apply_command(b"7", |v| v, None).unwrap(), 7.0);
        assert_eq!(core.value(), 7.0);
        assert_eq!(core.simulator().unwrap().value(), 7.0);

        assert!(matches!(
            core.apply_command(b"abc", |v| v, None),
            Err(EmulatorError::InvalidCommand { .. })
        ));
        assert!(core.apply_command(b"11", |v| v, None).is_err());
        assert!(core.apply_command(b"3", |v| v, Some((4.0, 6.0))).is_err());
        assert_eq!(core.value(), 7.0);

        core.reset();
        assert_eq!(core.start_value(), 5.0);
        assert_eq!(core.value(), 5.0);
        assert_eq!(core.simulator().unwrap().value(), 5.0);
    }
}
