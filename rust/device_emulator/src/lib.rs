pub mod config;
pub mod emulator;
pub mod error;
pub mod logging;
pub mod plugins;
pub mod sensor;
pub mod simulator;
pub mod transport;
pub mod wire;

pub use config::{load_config, resolve_config_path, EmulatorConfig};
pub use emulator::DeviceEmulator;
pub use error::{EmulatorError, Result};
pub use logging::{init_logger, parse_level};
