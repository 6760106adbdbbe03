use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::info;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ThermostatParams {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    target: f64,
}

/// Room thermostat. Commands move the target temperature; the reading follows
/// it through the simulator.
pub struct ThermostatSensor {
    core: SensorCore,
    target: f64,
}

impl ThermostatSensor {
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl SensorInterface for ThermostatSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "thermostat"
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let target = self.core.check_command(payload, |v| v, None)?;
        self.target = target;
        if let Some(simulator) = self.core.simulator_mut() {
            simulator.retarget(target);
        }
        info!("[{}] Setting target temperature: {}", self.core.name(), target);
        Ok(())
    }
}

pub(super) struct ThermostatSensorFactory;

impl SensorFactory for ThermostatSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: ThermostatParams = context.config.params()?;
        let core = context.build_core(
            params.temp,
            SimulatorSeed::with_target(params.temp, params.target),
            None,
        )?;
        Ok(Box::new(ThermostatSensor {
            core,
            target: params.target,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::interface::test_support::{context, sensor_config};
    use crate::simulator::SimulatorRegistry;
    use serde_json::json;

    fn thermostat(config: serde_json::Value) -> ThermostatSensor {
        let simulators = SimulatorRegistry::new();
        let config = sensor_config(config);
        let ctx = context("thermostat", &config, &simulators);
        let params: ThermostatParams = ctx.config.params().unwrap();
        let core = ctx
            .build_core(
                params.temp,
                SimulatorSeed::with_target(params.temp, params.target),
                None,
            )
            .unwrap();
        ThermostatSensor {
            core,
            target: params.target,
        }
    }

    #[test]
    fn test_command_retargets_simulator() {
        let mut sensor = thermostat(json!({
            "temp": 20,
            "target": 20,
            "simulator": { "type": "temp", "step_interval": 2, "decr_min": 1, "incr_max": 1 }
        }));
        assert_eq!(sensor.core().simulator().unwrap().bounds(), Some((19.0, 21.0)));

        sensor
            .handle_topic("devices/d1/commands/thermostat", b"30")
            .unwrap();
        assert_eq!(sensor.target(), 30.0);
        assert_eq!(sensor.core().value(), 20.0);
        assert_eq!(sensor.core().simulator().unwrap().bounds(), Some((29.0, 31.0)));

        let published: Vec<f64> = (0..6).map(|_| sensor.loop_tick()).collect();
        assert_eq!(published, vec![20.0, 22.0, 24.0, 26.0, 28.0, 30.0]);
    }

    #[test]
    fn test_invalid_target_ignored() {
        let mut sensor = thermostat(json!({ "temp": 18, "target": 21 }));
        assert!(sensor
            .handle_topic("devices/d1/commands/thermostat", b"warm")
            .is_err());
        assert_eq!(sensor.target(), 21.0);
        assert_eq!(sensor.core().value(), 18.0);
    }

    #[test]
    fn test_reset_keeps_target() {
        let mut sensor = thermostat(json!({ "temp": 18, "target": 21 }));
        sensor
            .handle_topic("devices/d1/commands/thermostat", b"25")
            .unwrap();
        sensor.reset();
        assert_eq!(sensor.core().value(), 18.0);
        assert_eq!(sensor.target(), 25.0);
    }
}
