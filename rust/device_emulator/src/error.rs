use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Zenoh error: {0}")]
    ZenohError(#[from] zenoh::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Unknown {kind} type: {name}")]
    UnknownType { kind: &'static str, name: String },
    #[error("Reserved {kind} type: {name}")]
    ReservedType { kind: &'static str, name: String },
    #[error("Invalid command for {sensor}: {payload:?} ({reason})")]
    InvalidCommand {
        sensor: String,
        payload: String,
        reason: String,
    },
    #[error("No sensors were started")]
    NoSensorsStarted,
}

impl EmulatorError {
    /// Process exit code the binary reports for a fatal error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EmulatorError::NoSensorsStarted => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
