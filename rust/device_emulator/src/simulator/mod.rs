//! Value simulators: the strategies sensors use to evolve their readings.

mod constant;
mod random;
mod stair;
mod target;

pub use constant::StaticSimulator;
pub use random::RandomSimulator;
pub use stair::StairSimulator;
pub use target::TargetSimulator;

use crate::config::SimulatorConfig;
use crate::error::{EmulatorError, Result};
use log::{debug, error};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;

pub trait Simulator: Send + Sync {
    /// Advances one tick and returns the new value.
    fn update(&mut self) -> f64;

    /// Whether an externally proposed value is acceptable.
    fn valid(&self, _value: f64) -> bool {
        true
    }

    /// Overwrites the current value without validating it.
    fn set_value(&mut self, value: f64);

    fn value(&self) -> f64;

    /// Moves the target of target-tracking simulators. Returns `false` when the
    /// simulator has no notion of a target.
    fn retarget(&mut self, _target: f64) -> bool {
        false
    }

    /// Current `[min, max]` band, if the simulator is bounded.
    fn bounds(&self) -> Option<(f64, f64)> {
        None
    }

    fn get_type(&self) -> &'static str;
}

/// Uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
pub struct ScriptedSource {
    draws: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, next: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}

pub fn random_source(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_entropy()),
    }
}

/// Starting point handed to a simulator by its sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatorSeed {
    pub value: f64,
    pub target: Option<f64>,
}

impl SimulatorSeed {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            target: None,
        }
    }

    pub fn with_target(value: f64, target: f64) -> Self {
        Self {
            value,
            target: Some(target),
        }
    }
}

pub trait SimulatorFactory: Send + Sync {
    fn create(&self, seed: SimulatorSeed, config: &SimulatorConfig) -> Result<Box<dyn Simulator>>;
}

/// Type names that never resolve to a simulator.
pub const RESERVED_SIMULATOR_TYPES: &[&str] = &["index", "simulator"];

pub struct SimulatorRegistry {
    factories: HashMap<String, Arc<dyn SimulatorFactory>>,
}

impl Default for SimulatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register_default_simulators();
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    fn register_default_simulators(&mut self) {
        self.factories
            .insert("static".to_string(), Arc::new(constant::StaticFactory));
        self.factories
            .insert("random".to_string(), Arc::new(random::RandomFactory));
        self.factories
            .insert("stair".to_string(), Arc::new(stair::StairFactory));
        self.factories
            .insert("temp".to_string(), Arc::new(target::TargetFactory));
    }

    pub fn register_simulator(
        &mut self,
        simulator_type: &str,
        factory: Arc<dyn SimulatorFactory>,
    ) -> Result<()> {
        if RESERVED_SIMULATOR_TYPES.contains(&simulator_type) {
            return Err(EmulatorError::ReservedType {
                kind: "simulator",
                name: simulator_type.to_string(),
            });
        }
        self.factories.insert(simulator_type.to_string(), factory);
        Ok(())
    }

    pub fn resolve(&self, simulator_type: &str) -> Result<Arc<dyn SimulatorFactory>> {
        if RESERVED_SIMULATOR_TYPES.contains(&simulator_type) {
            return Err(EmulatorError::ReservedType {
                kind: "simulator",
                name: simulator_type.to_string(),
            });
        }
        self.factories
            .get(simulator_type)
            .cloned()
            .ok_or_else(|| EmulatorError::UnknownType {
                kind: "simulator",
                name: simulator_type.to_string(),
            })
    }

    /// Builds a simulator, logging and returning `None` when the type cannot be
    /// resolved or its parameters are invalid.
    pub fn create_simulator(
        &self,
        seed: SimulatorSeed,
        config: &SimulatorConfig,
    ) -> Option<Box<dyn Simulator>> {
        let created = self
            .resolve(&config.simulator_type)
            .and_then(|factory| factory.create(seed, config));
        match created {
            Ok(simulator) => {
                debug!(
                    "Created {} simulator starting at {}",
                    simulator.get_type(),
                    seed.value
                );
                Some(simulator)
            }
            Err(e) => {
                error!(
                    "Could not create simulator '{}': {}",
                    config.simulator_type, e
                );
                None
            }
        }
    }
}

fn default_step() -> f64 {
    1.0
}

fn default_threshold() -> f64 {
    0.5
}

/// Applies one random-walk step: decrement wins when the thresholds overlap,
/// draws between them leave the value alone.
fn random_step(
    value: f64,
    draw: f64,
    step: f64,
    (min, max): (f64, f64),
    (decr_threshold, incr_threshold): (f64, f64),
) -> f64 {
    if draw <= decr_threshold {
        (value - step).max(min)
    } else if draw >= incr_threshold {
        (value + step).min(max)
    } else {
        value
    }
}
