use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::warn;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TempParams {
    #[serde(default)]
    temp: f64,
}

/// Read-only temperature probe.
pub struct TempSensor {
    core: SensorCore,
}

impl SensorInterface for TempSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "temp"
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let requested = self.core.check_command(payload, |v| v, None)?;
        warn!(
            "[{}] Temperature is read-only, ignoring {}",
            self.core.name(),
            requested
        );
        Ok(())
    }
}

pub(super) struct TempSensorFactory;

impl SensorFactory for TempSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: TempParams = context.config.params()?;
        let core = context.build_core(params.temp, SimulatorSeed::new(params.temp), None)?;
        Ok(Box::new(TempSensor { core }))
    }
}
