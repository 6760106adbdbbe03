use crate::config::SimulatorConfig;
use crate::error::Result;
use crate::sensor::interface::{SensorContext, SensorCore, SensorFactory, SensorInterface};
use crate::simulator::SimulatorSeed;
use log::info;
use serde::Deserialize;
use serde_json::json;

fn default_range() -> [f64; 2] {
    [0.0, 100.0]
}

#[derive(Debug, Deserialize)]
struct EngineTempParams {
    #[serde(default)]
    start: f64,
    #[serde(default = "default_range")]
    range: [f64; 2],
}

/// Engine temperature drifting inside `range`.
pub struct EngineTempSensor {
    core: SensorCore,
}

impl SensorInterface for EngineTempSensor {
    fn core(&self) -> &SensorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SensorCore {
        &mut self.core
    }

    fn get_type(&self) -> &'static str {
        "engine_temp"
    }

    fn handle_topic(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        if !self.is_handled_topic(topic) {
            return Ok(());
        }
        let temp = self.core.apply_command(payload, |v| v, None)?;
        info!("[{}] Setting engine temperature: {}", self.core.name(), temp);
        Ok(())
    }
}

pub(super) struct EngineTempSensorFactory;

impl SensorFactory for EngineTempSensorFactory {
    fn create(&self, context: &SensorContext<'_>) -> Result<Box<dyn SensorInterface>> {
        let params: EngineTempParams = context.config.params()?;
        let [min, max] = params.range;
        let drift = SimulatorConfig::new(
            "random",
            json!({
                "step_interval": 1.0,
                "min": min,
                "max": max,
                "decr_threshold": 0.3,
                "incr_threshold": 0.5
            }),
        );
        let core = context.build_core(params.start, SimulatorSeed::new(params.start), Some(drift))?;
        Ok(Box::new(EngineTempSensor { core }))
    }
}
