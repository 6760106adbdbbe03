#[allow(clippy::module_inception)]
mod emulator;
pub use emulator::DeviceEmulator;

/// One sensor as seen from outside the emulator.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorStatus {
    pub name: String,
    pub sensor_type: &'static str,
    pub publish_topic: String,
    pub subscribe_topic: String,
    pub value: f64,
    pub running: bool,
}
