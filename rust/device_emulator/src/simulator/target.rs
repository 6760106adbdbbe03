use super::{
    default_threshold, random_source, random_step, RandomSource, Simulator, SimulatorFactory,
    SimulatorSeed,
};
use crate::config::SimulatorConfig;
use crate::error::Result;
use log::debug;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct TargetParams {
    pub step_interval: f64,
    pub decr_min: f64,
    pub incr_max: f64,
    #[serde(default = "default_threshold")]
    pub incr_threshold: f64,
    #[serde(default = "default_threshold")]
    pub decr_threshold: f64,
}

/// Thermostat-like tracking of a target.
///
/// Outside `[target - decr_min, target + incr_max]` the value stairs toward the
/// band by `step_interval`; inside it wanders in unit steps.
pub struct TargetSimulator {
    value: f64,
    target: f64,
    min: f64,
    max: f64,
    params: TargetParams,
    source: Box<dyn RandomSource>,
}

impl TargetSimulator {
    pub fn new(
        value: f64,
        target: f64,
        params: TargetParams,
        source: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            value,
            target,
            min: target - params.decr_min,
            max: target + params.incr_max,
            params,
            source,
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Simulator for TargetSimulator {
    fn update(&mut self) -> f64 {
        if self.value > self.max {
            self.value = (self.value - self.params.step_interval).max(self.min);
        } else if self.value < self.min {
            self.value = (self.value + self.params.step_interval).min(self.max);
        } else {
            let draw = self.source.next_unit();
            self.value = random_step(
                self.value,
                draw,
                1.0,
                (self.min, self.max),
                (self.params.decr_threshold, self.params.incr_threshold),
            );
        }
        debug!(
            "Simulator thermostat update value: {} for target: {}",
            self.value, self.target
        );
        self.value
    }

    fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn retarget(&mut self, target: f64) -> bool {
        self.target = target;
        self.min = target - self.params.decr_min;
        self.max = target + self.params.incr_max;
        true
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.min, self.max))
    }

    fn get_type(&self) -> &'static str {
        "temp"
    }
}

pub struct TargetFactory;

impl SimulatorFactory for TargetFactory {
    fn create(&self, seed: SimulatorSeed, config: &SimulatorConfig) -> Result<Box<dyn Simulator>> {
        let params: TargetParams = config.params()?;
        let target = seed.target.unwrap_or(seed.value);
        Ok(Box::new(TargetSimulator::new(
            seed.value,
            target,
            params,
            random_source(config.seed),
        )))
    }
}
