use super::{Simulator, SimulatorFactory, SimulatorSeed};
use crate::config::SimulatorConfig;
use crate::error::Result;
use log::trace;

/// Holds its value until told otherwise.
pub struct StaticSimulator {
    value: f64,
}

impl StaticSimulator {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Simulator for StaticSimulator {
    fn update(&mut self) -> f64 {
        trace!("Simulator static update: {}", self.value);
        self.value
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn get_type(&self) -> &'static str {
        "static"
    }
}

pub struct StaticFactory;

impl SimulatorFactory for StaticFactory {
    fn create(&self, seed: SimulatorSeed, _config: &SimulatorConfig) -> Result<Box<dyn Simulator>> {
        Ok(Box::new(StaticSimulator::new(seed.value)))
    }
}
