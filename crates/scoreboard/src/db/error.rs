//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// Broad category of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// A uniqueness constraint rejected the write.
    #[display("conflict")]
    Conflict,
    /// The targeted row does not exist.
    #[display("not found")]
    NotFound,
    /// No connection could be checked out of the pool.
    #[display("pool")]
    Pool,
    /// Applying the embedded schema failed.
    #[display("migration")]
    Migration,
    /// Any other query or connection failure.
    #[display("query")]
    Query,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns true when the error is a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        self.kind == DbErrorKind::Conflict
    }

    /// Returns true when the targeted row was missing.
    pub fn is_not_found(&self) -> bool {
        self.kind == DbErrorKind::NotFound
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::NotFound => DbErrorKind::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbErrorKind::Conflict
            }
            _ => DbErrorKind::Query,
        };
        Self::new(kind, format!("Diesel error: {}", err))
    }
}

impl From<diesel::r2d2::PoolError> for DbError {
    #[track_caller]
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::new(DbErrorKind::Pool, format!("Pool error: {}", err))
    }
}
