//! Scoreboard business logic layer.

use derive_more::{Display, Error, From};
use tracing::{debug, info, instrument, warn};

use crate::{DbError, NewUser, ScoreRepository, ScoreStatus, ScoreUpdate, User};

/// Failure of a scoreboard operation.
#[derive(Debug, Clone, Display, Error, From)]
pub enum ServiceError {
    /// The caller referenced an unregistered user or sent an unknown status.
    #[display("{}", _0)]
    InvalidRequest(#[error(not(source))] String),
    /// A lookup by id or name found nothing.
    #[display("{}", _0)]
    NotFound(#[error(not(source))] String),
    /// The persistence layer failed.
    #[display("{}", _0)]
    #[from]
    Database(DbError),
}

/// Message used for every missed lookup.
pub const USER_NOT_FOUND: &str = "User not found";

/// Service layer for registration, score updates and leaderboard reads.
///
/// Every operation checks out one session from the repository and holds it
/// until the operation returns.
#[derive(Debug, Clone)]
pub struct ScoreService {
    repository: ScoreRepository,
}

impl ScoreService {
    /// Creates a new score service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: ScoreRepository) -> Self {
        info!("Creating ScoreService");
        Self { repository }
    }

    /// Registers each name, returning one user per input name in order.
    ///
    /// Names that already exist are returned unchanged. A name repeated in
    /// the input is created once and then found on later occurrences.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub fn register_users(&self, names: Vec<String>) -> Result<Vec<User>, ServiceError> {
        let mut session = self.repository.session()?;
        let mut users = Vec::with_capacity(names.len());

        for name in names {
            if let Some(user) = session.get_user_by_name(&name)? {
                debug!(user_id = user.id(), "Existing user found");
                users.push(user);
            } else {
                info!(name = %name, "Registering new user");
                users.push(session.create_user(NewUser::new(name, 0))?);
            }
        }

        Ok(users)
    }

    /// Applies a batch of win/lose updates.
    ///
    /// Every entry is validated before any score changes, so one bad entry
    /// leaves all scores untouched. Valid batches are applied in input
    /// order and repeated names accumulate.
    #[instrument(skip(self, updates), fields(count = updates.len()))]
    pub fn update_scores(&self, updates: Vec<ScoreUpdate>) -> Result<Vec<User>, ServiceError> {
        let mut session = self.repository.session()?;

        let mut validated = Vec::with_capacity(updates.len());
        for update in &updates {
            if session.get_user_by_name(update.name())?.is_none() {
                warn!(name = %update.name(), "Score update for unregistered user");
                return Err(ServiceError::InvalidRequest(format!(
                    "User ({}) not registered",
                    update.name()
                )));
            }
            let status = update.status().parse::<ScoreStatus>().map_err(|_| {
                warn!(name = %update.name(), status = %update.status(), "Unknown status");
                ServiceError::InvalidRequest(format!(
                    "Status ({}) for user ({}) not valid",
                    update.status(),
                    update.name()
                ))
            })?;
            validated.push((update.name(), status));
        }
        debug!("Batch validated");

        let mut users = Vec::with_capacity(validated.len());
        for (name, status) in validated {
            users.push(session.update_user_score(name, status.delta())?);
        }

        info!(applied = users.len(), "Score batch applied");
        Ok(users)
    }

    /// Lists users in id order with offset/limit paging.
    #[instrument(skip(self))]
    pub fn list_users(&self, skip: i64, limit: Option<i64>) -> Result<Vec<User>, ServiceError> {
        Ok(self.repository.session()?.get_users(skip, limit)?)
    }

    /// Returns up to ten users with the highest scores, best first.
    #[instrument(skip(self))]
    pub fn top10(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.repository.session()?.get_users_top10()?)
    }

    /// Looks up a user by id.
    #[instrument(skip(self))]
    pub fn get_user_by_id(&self, id: i32) -> Result<User, ServiceError> {
        self.repository
            .session()?
            .get_user_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))
    }

    /// Looks up a user by exact name.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&self, name: &str) -> Result<User, ServiceError> {
        self.repository
            .session()?
            .get_user_by_name(name)?
            .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))
    }
}
