use super::{Simulator, SimulatorFactory, SimulatorSeed};
use crate::config::SimulatorConfig;
use crate::error::Result;
use log::debug;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct StairParams {
    pub step_interval: f64,
    pub min: f64,
    pub max: f64,
}

/// Climbs to `max` in fixed steps, then walks back down to `min`, and so on.
pub struct StairSimulator {
    value: f64,
    params: StairParams,
    ascend: bool,
}

impl StairSimulator {
    pub fn new(value: f64, params: StairParams) -> Self {
        Self {
            value,
            params,
            ascend: true,
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.ascend
    }
}

impl Simulator for StairSimulator {
    fn update(&mut self) -> f64 {
        if self.ascend {
            self.value += self.params.step_interval;
            if self.value >= self.params.max {
                self.value = self.params.max;
                self.ascend = false;
            }
        } else {
            self.value -= self.params.step_interval;
            if self.value <= self.params.min {
                self.value = self.params.min;
                self.ascend = true;
            }
        }
        debug!("Simulator stair update value: {}", self.value);
        self.value
    }

    fn valid(&self, value: f64) -> bool {
        value >= self.params.min && value <= self.params.max
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.params.min, self.params.max))
    }

    fn get_type(&self) -> &'static str {
        "stair"
    }
}

pub struct StairFactory;

impl SimulatorFactory for StairFactory {
    fn create(&self, seed: SimulatorSeed, config: &SimulatorConfig) -> Result<Box<dyn Simulator>> {
        let params: StairParams = config.params()?;
        Ok(Box::new(StairSimulator::new(seed.value, params)))
    }
}
