use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Numeric error: {0}")]
    NumericError(String),

    #[error("Simulation did not converge: {0}")]
    NonConvergence(String),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Motor file error at line {line}: {message}")]
    MotorFile { line: usize, message: String },

    #[error("Cannot find motor: {0}")]
    MotorNotFound(String),

    #[error("Unknown {kind} unit: {unit}")]
    UnknownUnit { kind: String, unit: String },

    #[error("Batch error at line {line}: {message}")]
    Batch { line: usize, message: String },

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
