//! Scoreboard - win/lose score tracking over HTTP
//!
//! Registers users by name, applies batches of win/lose outcomes to their
//! scores, and serves listings and a top-ten leaderboard as JSON.
//!
//! # Architecture
//!
//! - **Persistence**: [`ScoreRepository`] pools SQLite connections and hands
//!   out one [`ScoreSession`] per request
//! - **Service**: [`ScoreService`] holds registration and two-phase
//!   score-update logic
//! - **API**: [`router`] and [`app`] expose the service through axum
//!
//! # Example
//!
//! ```no_run
//! use scoreboard::{AppState, ScoreRepository, ScoreService, router};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = ScoreRepository::new("scoreboard.db".to_string(), 4)?;
//! repository.run_migrations()?;
//! let app = router(AppState::new(ScoreService::new(repository)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod db;
mod score_service;
mod status;

// Crate-level exports - HTTP layer
pub use api::{ApiError, AppState, app, cors_layer, router};

// Crate-level exports - Configuration
pub use config::{ConfigError, DATABASE_URL_ENV, ServerConfig};

// Crate-level exports - Persistence
pub use db::{DbError, DbErrorKind, NewUser, ScoreRepository, ScoreSession, User};

// Crate-level exports - Service layer
pub use score_service::{ScoreService, ServiceError, USER_NOT_FOUND};

// Crate-level exports - Score updates
pub use status::{ScoreStatus, ScoreUpdate};
