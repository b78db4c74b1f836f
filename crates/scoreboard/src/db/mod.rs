//! Database persistence layer for users and their scores.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{NewUser, User};
pub use repository::{ScoreRepository, ScoreSession};
