//! Built-in sensor types and the registry that resolves them by name.

use crate::error::{EmulatorError, Result};
use crate::sensor::interface::{SensorContext, SensorFactory, SensorInterface};
use log::{debug, error};
use std::collections::HashMap;
use std::sync::Arc;

mod door;
mod engine_temp;
mod speed;
mod temp;
mod thermostat;
mod wheel;
mod wheel_position;

pub use door::DoorSensor;
pub use engine_temp::EngineTempSensor;
pub use speed::SpeedSensor;
pub use temp::TempSensor;
pub use thermostat::ThermostatSensor;
pub use wheel::WheelSensor;
pub use wheel_position::WheelPositionSensor;

/// Type names that never resolve to a sensor.
pub const RESERVED_SENSOR_TYPES: &[&str] = &["index", "utils", "sensor"];

pub struct SensorRegistry {
    factories: HashMap<String, Arc<dyn SensorFactory>>,
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register_default_sensors();
        registry
    }

    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    fn register_default_sensors(&mut self) {
        let defaults: [(&str, Arc<dyn SensorFactory>); 7] = [
            ("door", Arc::new(door::DoorSensorFactory)),
            ("speed", Arc::new(speed::SpeedSensorFactory)),
            ("wheel", Arc::new(wheel::WheelSensorFactory)),
            ("thermostat", Arc::new(thermostat::ThermostatSensorFactory)),
            ("temp", Arc::new(temp::TempSensorFactory)),
            ("engine_temp", Arc::new(engine_temp::EngineTempSensorFactory)),
            (
                "wheel_position",
                Arc::new(wheel_position::WheelPositionSensorFactory),
            ),
        ];
        for (sensor_type, factory) in defaults {
            self.factories.insert(sensor_type.to_string(), factory);
        }
    }

    pub fn register_sensor(
        &mut self,
        sensor_type: &str,
        factory: Arc<dyn SensorFactory>,
    ) -> Result<()> {
        if RESERVED_SENSOR_TYPES.contains(&sensor_type) {
            return Err(EmulatorError::ReservedType {
                kind: "sensor",
                name: sensor_type.to_string(),
            });
        }
        self.factories.insert(sensor_type.to_string(), factory);
        Ok(())
    }

    pub fn resolve(&self, sensor_type: &str) -> Result<Arc<dyn SensorFactory>> {
        if RESERVED_SENSOR_TYPES.contains(&sensor_type) {
            return Err(EmulatorError::ReservedType {
                kind: "sensor",
                name: sensor_type.to_string(),
            });
        }
        self.factories
            .get(sensor_type)
            .cloned()
            .ok_or_else(|| EmulatorError::UnknownType {
                kind: "sensor",
                name: sensor_type.to_string(),
            })
    }

    /// Builds a sensor, logging and returning `None` when the type cannot be
    /// resolved or the sensor configuration is invalid.
    pub fn create_sensor(
        &self,
        sensor_type: &str,
        context: &SensorContext<'_>,
    ) -> Option<Box<dyn SensorInterface>> {
        match self
            .resolve(sensor_type)
            .and_then(|factory| factory.create(context))
        {
            Ok(sensor) => {
                debug!("Created {} sensor {}", sensor_type, context.name);
                Some(sensor)
            }
            Err(e) => {
                error!("Could not create sensor '{}': {}", sensor_type, e);
                None
            }
        }
    }

    pub fn sensor_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// Coerces any nonzero reading to 1.
fn binary_state(value: f64) -> f64 {
    if value != 0.0 {
        1.0
    } else {
        0.0
    }
}
