use thiserror::Error;

use domain::errors::DomainError;

/// Storage-layer failures. Repositories fold these into the domain
/// taxonomy at the crate boundary, so controllers never see sqlx types.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("row not found: {0}")]
    MissingRow(String),

    #[error("conflicting row for {0}")]
    Conflict(String),

    #[error("stored value could not be decoded: {0}")]
    Decode(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for DomainError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::MissingRow(what) => DomainError::NotFound(what),
            // A conflicting row is always a scheduled-occurrence collision
            // under the (dynasty_id, game_id) uniqueness rule.
            DbError::Conflict(what) => DomainError::DuplicateGameId(what),
            // Undecodable persisted state is corruption, not an I/O fault.
            DbError::Decode(what) => DomainError::StateCorruption(what),
            DbError::Query(e) => DomainError::DatabaseError(e.to_string()),
        }
    }
}
