use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate value: {0}")]
    Uniqueness(String),

    #[error("referenced row does not exist: {0}")]
    ForeignKey(String),

    #[error("row is still referenced by dependent rows: {0}")]
    ReferentialBlock(String),

    #[error("value rejected by schema constraint: {0}")]
    InvalidValue(String),

    #[error("manager assignment would create a cycle: employee {employee_id} is an ancestor of {manager_id}")]
    ManagerCycle { employee_id: i32, manager_id: i32 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("connection failure: {0}")]
    Connection(String),

    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

impl Error {
    /// Classify a driver error raised by an insert or update.
    ///
    /// A foreign-key violation here means the caller referenced a parent
    /// row that does not exist.
    pub(crate) fn from_write(err: tokio_postgres::Error) -> Self {
        let code = err.code();
        if code == Some(&SqlState::UNIQUE_VIOLATION) {
            Self::Uniqueness(db_message(&err))
        } else if code == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
            Self::ForeignKey(db_message(&err))
        } else if code == Some(&SqlState::CHECK_VIOLATION) {
            Self::InvalidValue(db_message(&err))
        } else {
            Self::Postgres(err)
        }
    }

    /// Classify a driver error raised by a delete.
    ///
    /// A foreign-key violation here means dependent rows still reference
    /// the target, so the delete is blocked rather than misreported as a
    /// missing parent.
    pub(crate) fn from_delete(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
            Self::ReferentialBlock(db_message(&err))
        } else {
            Self::Postgres(err)
        }
    }
}

fn db_message(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => match db.constraint() {
            Some(constraint) => format!("{} (constraint {})", db.message(), constraint),
            None => db.message().to_string(),
        },
        None => err.to_string(),
    }
}

impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<deadpool_postgres::CreatePoolError> for Error {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        Self::Connection(err.to_string())
    }
}
