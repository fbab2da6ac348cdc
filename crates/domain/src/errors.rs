use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate game id: {0}")]
    DuplicateGameId(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Dynasty state missing: {0}")]
    StateMissing(String),

    #[error("State corruption: {0}")]
    StateCorruption(String),

    #[error("Simulation error: {0}")]
    SimulationError(String),

    #[error("Cap violation: {0}")]
    CapViolation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
