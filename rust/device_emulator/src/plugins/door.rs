use super::binary_state;
use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::info;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct DoorParams {
    #[serde(default)]
    state: f64,
}

/// Open/closed door. Every reading is 0 or 1.
pub struct DoorSensor {
    core: SensorCore,
}

impl SensorInterface for DoorSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "door"
    }

    fn loop_tick(&mut self) -> f64 {
        let current = self.core.value();
        if self.core.simulator().is_some() {
            let next = binary_state(self.core.advance());
            self.core.commit(next);
        }
        current
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let state = self.core.apply_command(payload, binary_state, None)?;
        info!("[{}] Setting door state: {}", self.core.name(), state);
        Ok(())
    }
}

pub(super) struct DoorSensorFactory;

impl SensorFactory for DoorSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: DoorParams = context.config.params()?;
        let core = context.build_core(params.state, SimulatorSeed::new(params.state), None)?;
        Ok(Box::new(DoorSensor { core }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::interface::test_support::{context, sensor_config};
    use crate::simulator::SimulatorRegistry;
    use serde_json::json;

    fn door(config: serde_json::Value) -> Box<dyn SensorInterface> {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(config);
        DoorSensorFactory
            .create(&context("door", &config, &simulators))
            .unwrap()
    }

    #[test]
    fn test_command_is_coerced_to_binary() {
        let mut sensor = door(json!({}));
        sensor.handle_topic("devices/d1/commands/door", b"5").unwrap();
        assert_eq!(sensor.core().value(), 1.0);
        sensor.handle_topic("devices/d1/commands/door", b"0").unwrap();
        assert_eq!(sensor.core().value(), 0.0);
        sensor.handle_topic("devices/d1/commands/door", b"-3").unwrap();
        assert_eq!(sensor.core().value(), 1.0);
    }

    #[test]
    fn test_non_numeric_command_leaves_state() {
        let mut sensor = door(json!({ "state": 1 }));
        assert!(sensor
            .handle_topic("devices/d1/commands/door", b"abc")
            .is_err());
        assert_eq!(sensor.core().value(), 1.0);
    }

    #[test]
    fn test_simulated_readings_are_binary() {
        let mut sensor = door(json!({
            "simulator": { "type": "stair", "step_interval": 2, "min": 0, "max": 4 }
        }));
        let published: Vec<f64> = (0..5).map(|_| sensor.loop_tick()).collect();
        assert_eq!(published, vec![0.0, 1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_static_without_simulator() {
        let mut sensor = door(json!({ "state": 1 }));
        assert_eq!(sensor.loop_tick(), 1.0);
        assert_eq!(sensor.loop_tick(), 1.0);
    }
}
