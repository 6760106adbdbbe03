use crate::config::SimulatorConfig;
use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::info;
use serde::Deserialize;
use serde_json::json;

fn default_rate() -> f64 {
    5.0
}

fn default_max() -> f64 {
    60.0
}

#[derive(Debug, Deserialize)]
struct SpeedParams {
    #[serde(default, alias = "start")]
    speed: f64,
    #[serde(default = "default_rate")]
    rate: f64,
    #[serde(default = "default_max")]
    max: f64,
}

/// Vehicle speed. Without a configured simulator it ramps between 0 and `max`
/// by `rate` per tick.
pub struct SpeedSensor {
    core: SensorCore,
}

impl SensorInterface for SpeedSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "speed"
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let speed = self.core.apply_command(payload, |v| v, None)?;
        info!("[{}] Setting speed: {}", self.core.name(), speed);
        Ok(())
    }
}

pub(super) struct SpeedSensorFactory;

impl SensorFactory for SpeedSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: SpeedParams = context.config.params()?;
        let ramp = SimulatorConfig::new(
            "stair",
            json!({ "step_interval": params.rate, "min": 0.0, "max": params.max }),
        );
        let core = context.build_core(params.speed, SimulatorSeed::new(params.speed), Some(ramp))?;
        Ok(Box::new(SpeedSensor { core }))
    }
}
