use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::info;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WheelParams {
    #[serde(default)]
    position: f64,
    #[serde(default)]
    min_position: f64,
    #[serde(default)]
    max_position: f64,
}

/// Steering wheel position, held within `[min_position, max_position]`.
pub struct WheelSensor {
    core: SensorCore,
    bounds: (f64, f64),
}

impl SensorInterface for WheelSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "wheel"
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let position = self.core.apply_command(payload, |v| v, Some(self.bounds))?;
        info!("[{}] Setting wheel position: {}", self.core.name(), position);
        Ok(())
    }
}

pub(super) struct WheelSensorFactory;

impl SensorFactory for WheelSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: WheelParams = context.config.params()?;
        let core = context.build_core(params.position, SimulatorSeed::new(params.position), None)?;
        Ok(Box::new(WheelSensor {
            core,
            bounds: (params.min_position, params.max_position),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::interface::test_support::{context, sensor_config};
    use crate::simulator::SimulatorRegistry;
    use serde_json::json;

    fn wheel(config: serde_json::Value) -> Box<dyn SensorInterface> {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(config);
        WheelSensorFactory
            .create(&context("wheel", &config, &simulators))
            .unwrap()
    }

    #[test]
    fn test_position_within_bounds() {
        let mut sensor = wheel(json!({ "min_position": -10, "max_position": 10 }));
        sensor.handle_topic("devices/d1/commands/wheel", b"-10").unwrap();
        assert_eq!(sensor.core().value(), -10.0);
        sensor.handle_topic("devices/d1/commands/wheel", b"7").unwrap();
        assert_eq!(sensor.core().value(), 7.0);
    }

    #[test]
    fn test_position_out_of_bounds_rejected() {
        let mut sensor = wheel(json!({ "position": 2, "min_position": -10, "max_position": 10 }));
        assert!(sensor
            .handle_topic("devices/d1/commands/wheel", b"11")
            .is_err());
        assert!(sensor
            .handle_topic("devices/d1/commands/wheel", b"-11")
            .is_err());
        assert!(sensor
            .handle_topic("devices/d1/commands/wheel", b"abc")
            .is_err());
        assert_eq!(sensor.core().value(), 2.0);
    }

    #[test]
    fn test_default_bounds_only_allow_zero() {
        let mut sensor = wheel(json!({}));
        assert!(sensor.handle_topic("devices/d1/commands/wheel", b"1").is_err());
        sensor.handle_topic("devices/d1/commands/wheel", b"0").unwrap();
        assert_eq!(sensor.loop_tick(), 0.0);
    }
}
