use thiserror::Error;

/// Errors surfaced by the simulation core. None of them leave a partially
/// applied tick behind.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SimError {
    #[error("delta time must be finite and greater than 0 (got {0})")]
    InvalidDeltaTime(f64),
    #[error("unknown environmental parameter `{0}`")]
    UnknownParameter(String),
    #[error("invalid value {value} for environmental parameter `{key}`")]
    InvalidParameter { key: String, value: f64 },
    #[error("catastrophe intensity must be within [0, 1] (got {0})")]
    InvalidIntensity(f64),
    #[error("invalid color `{0}`; expected #rrggbb")]
    InvalidColor(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("agent {0} not found")]
    AgentNotFound(String),
}
