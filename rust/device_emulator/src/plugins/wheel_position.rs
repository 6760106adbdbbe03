use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::info;
use serde::Deserialize;

fn default_min() -> f64 {
    -45.0
}

fn default_max() -> f64 {
    45.0
}

#[derive(Debug, Deserialize)]
struct WheelPositionParams {
    #[serde(default)]
    start: f64,
    #[serde(default = "default_min")]
    min: f64,
    #[serde(default = "default_max")]
    max: f64,
}

/// Steering angle in degrees. Only moves on command.
pub struct WheelPositionSensor {
    core: SensorCore,
    bounds: (f64, f64),
}

impl SensorInterface for WheelPositionSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "wheel_position"
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let angle = self.core.apply_command(payload, |v| v, Some(self.bounds))?;
        info!("[{}] Setting wheel position: {}", self.core.name(), angle);
        Ok(())
    }
}

pub(super) struct WheelPositionSensorFactory;

impl SensorFactory for WheelPositionSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: WheelPositionParams = context.config.params()?;
        let core = context.build_core(params.start, SimulatorSeed::new(params.start), None)?;
        Ok(Box::new(WheelPositionSensor {
            core,
            bounds: (params.min, params.max),
        }))
    }
}
