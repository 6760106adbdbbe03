use super::{
    default_step, default_threshold, random_source, random_step, RandomSource, Simulator,
    SimulatorFactory, SimulatorSeed,
};
use crate::config::SimulatorConfig;
use crate::error::Result;
use log::debug;
use serde::Deserialize;

fn default_max() -> f64 {
    5.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct RandomParams {
    #[serde(default = "default_step")]
    pub step_interval: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default = "default_max")]
    pub max: f64,
    #[serde(default = "default_threshold")]
    pub incr_threshold: f64,
    #[serde(default = "default_threshold")]
    pub decr_threshold: f64,
}

impl Default for RandomParams {
    fn default() -> Self {
        Self {
            step_interval: default_step(),
            min: 0.0,
            max: default_max(),
            incr_threshold: default_threshold(),
            decr_threshold: default_threshold(),
        }
    }
}

/// Bounded random walk.
///
/// Each tick draws `r` in `[0, 1)`: `r <= decr_threshold` steps down,
/// otherwise `r >= incr_threshold` steps up, anything in between holds.
pub struct RandomSimulator {
    value: f64,
    params: RandomParams,
    source: Box<dyn RandomSource>,
}

impl RandomSimulator {
    pub fn new(value: f64, params: RandomParams, source: Box<dyn RandomSource>) -> Self {
        Self {
            value,
            params,
            source,
        }
    }
}

impl Simulator for RandomSimulator {
    fn update(&mut self) -> f64 {
        let draw = self.source.next_unit();
        self.value = random_step(
            self.value,
            draw,
            self.params.step_interval,
            (self.params.min, self.params.max),
            (self.params.decr_threshold, self.params.incr_threshold),
        );
        debug!("Simulator random update value: {}", self.value);
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
        "random"
    }
}

pub struct RandomFactory;

impl SimulatorFactory for RandomFactory {
    fn create(&self, seed: SimulatorSeed, config: &SimulatorConfig) -> Result<Box<dyn Simulator>> {
        let params: RandomParams = config.params()?;
        Ok(Box::new(RandomSimulator::new(
            seed.value,
            params,
            random_source(config.seed),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::ScriptedSource;

    fn scripted(value: f64, params: RandomParams, draws: Vec<f64>) -> RandomSimulator {
        RandomSimulator::new(value, params, Box::new(ScriptedSource::new(draws)))
    }

    #[test]
    fn test_threshold_draws() {
        let mut simulator = scripted(2.0, RandomParams::default(), vec![0.5, 0.7, 0.2]);
        // 0.5 equals both thresholds, decrement is checked first
        assert_eq!(simulator.update(), 1.0);
        assert_eq!(simulator.update(), 2.0);
        assert_eq!(simulator.update(), 1.0);
    }

    #[test]
    fn test_gap_between_thresholds_holds() {
        let params = RandomParams {
            decr_threshold: 0.3,
            incr_threshold: 0.7,
            ..Default::default()
        };
        let mut simulator = scripted(2.0, params, vec![0.3, 0.31, 0.69, 0.7]);
        assert_eq!(simulator.update(), 1.0);
        assert_eq!(simulator.update(), 1.0);
        assert_eq!(simulator.update(), 1.0);
        assert_eq!(simulator.update(), 2.0);
    }

    #[test]
    fn test_stays_within_bounds() {
        let params = RandomParams {
            step_interval: 3.0,
            min: -4.0,
            max: 4.0,
            decr_threshold: 0.4,
            incr_threshold: 0.6,
        };
        let draws = vec![0.0, 0.4, 0.6, 0.99, 0.6, 0.6, 0.6, 0.4, 0.4, 0.4, 0.4, 0.5];
        for start in [-4.0, -1.0, 0.0, 2.5, 4.0] {
            let mut simulator = scripted(start, params.clone(), draws.clone());
            for _ in 0..draws.len() * 3 {
                let value = simulator.update();
                assert!((-4.0..=4.0).contains(&value), "{} escaped bounds", value);
            }
        }
    }

    #[test]
    fn test_seeded_walk_stays_within_bounds() {
        let config = SimulatorConfig {
            simulator_type: "random".to_string(),
            seed: Some(7),
            custom_config: serde_json::json!({ "min": 10, "max": 20, "step_interval": 2 })
                .as_object()
                .cloned()
                .unwrap(),
        };
        let mut simulator = RandomFactory
            .create(SimulatorSeed::new(15.0), &config)
            .unwrap();
        for _ in 0..1000 {
            let value = simulator.update();
            assert!((10.0..=20.0).contains(&value));
        }
    }

    #[test]
    fn test_valid_range() {
        let simulator = scripted(0.0, RandomParams::default(), vec![]);
        assert!(simulator.valid(0.0));
        assert!(simulator.valid(5.0));
        assert!(!simulator.valid(-1.0));
        assert!(!simulator.valid(6.0));
        assert_eq!(simulator.bounds(), Some((0.0, 5.0)));
    }

    #[test]
    fn test_set_value_continues_from_there() {
        let mut simulator = scripted(0.0, RandomParams::default(), vec![0.9]);
        simulator.set_value(4.0);
        assert_eq!(simulator.update(), 5.0);
        assert_eq!(simulator.update(), 5.0);
    }
}
