//! Database repository for users and scores.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, DbErrorKind, NewUser, User, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Maximum number of rows returned by [`ScoreSession::get_users_top10`].
pub const TOP_LIMIT: i64 = 10;

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Applies per-connection SQLite pragmas when the pool opens a connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Connection pool over the scoreboard database.
///
/// Cloning is cheap; all clones share the same pool.
#[derive(Clone)]
pub struct ScoreRepository {
    database_url: String,
    pool: SqlitePool,
}

impl std::fmt::Debug for ScoreRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreRepository")
            .field("database_url", &self.database_url)
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl ScoreRepository {
    /// Creates a repository backed by a pool of `pool_size` connections to
    /// the SQLite database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the pool cannot open its initial connections.
    #[instrument(skip(database_url), fields(database_url = %database_url))]
    pub fn new(database_url: String, pool_size: u32) -> Result<Self, DbError> {
        info!(database_url = %database_url, pool_size, "Creating ScoreRepository");
        let manager = ConnectionManager::<SqliteConnection>::new(database_url.clone());
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(SqlitePragmas))
            .build(manager)?;
        Ok(Self { database_url, pool })
    }

    /// Applies any pending schema migrations embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a connection cannot be acquired or a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Migration, e.to_string()))?;
        if applied.is_empty() {
            debug!("Schema already up to date");
        } else {
            info!(count = applied.len(), "Migrations applied");
        }
        Ok(())
    }

    /// Checks a connection out of the pool for the duration of one request.
    ///
    /// The connection is returned to the pool when the session is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the pool is exhausted past its timeout.
    #[instrument(skip(self))]
    pub fn session(&self) -> Result<ScoreSession, DbError> {
        let state = self.pool.state();
        debug!(
            connections = state.connections,
            idle = state.idle_connections,
            "Acquiring session"
        );
        let conn = self.pool.get()?;
        Ok(ScoreSession { conn })
    }
}

/// A pooled connection scoped to a single request.
pub struct ScoreSession {
    conn: PooledConnection<ConnectionManager<SqliteConnection>>,
}

impl ScoreSession {
    fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Gets a user by exact name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&mut self, name: &str) -> Result<Option<User>, DbError> {
        debug!(name = %name, "Looking up user by name");

        let user: Option<User> = schema::users::table
            .filter(schema::users::name.eq(name))
            .select(User::as_select())
            .first(self.conn())
            .optional()?;

        if let Some(ref u) = user {
            debug!(user_id = u.id(), "User found");
        } else {
            debug!("User not found");
        }

        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_id(&mut self, id: i32) -> Result<Option<User>, DbError> {
        debug!(user_id = id, "Looking up user by id");

        let user: Option<User> = schema::users::table
            .find(id)
            .select(User::as_select())
            .first(self.conn())
            .optional()?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind [`DbErrorKind::Conflict`] if the name is
    /// already taken, or another kind if a database error occurs.
    #[instrument(skip(self, new_user), fields(name = %new_user.name()))]
    pub fn create_user(&mut self, new_user: NewUser) -> Result<User, DbError> {
        debug!("Creating user");

        let user: User = diesel::insert_into(schema::users::table)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result(self.conn())
            .inspect_err(|e| warn!(error = %e, "Insert rejected"))?;

        info!(user_id = user.id(), name = %user.name(), "User created");
        Ok(user)
    }

    /// Lists users in id order, skipping `skip` rows and returning at most
    /// `limit` rows (all remaining rows when `limit` is `None`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_users(&mut self, skip: i64, limit: Option<i64>) -> Result<Vec<User>, DbError> {
        debug!("Listing users");

        let mut query = schema::users::table
            .select(User::as_select())
            .order(schema::users::id.asc())
            .offset(skip)
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        let users: Vec<User> = query.load(self.conn())?;
        info!(count = users.len(), "Users loaded");
        Ok(users)
    }

    /// Returns the highest-scoring users, best first. Equal scores are
    /// ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_users_top10(&mut self) -> Result<Vec<User>, DbError> {
        debug!("Loading leaderboard");

        let users: Vec<User> = schema::users::table
            .select(User::as_select())
            .order((schema::users::score.desc(), schema::users::id.asc()))
            .limit(TOP_LIMIT)
            .load(self.conn())?;

        info!(count = users.len(), "Leaderboard loaded");
        Ok(users)
    }

    /// Adds `delta` to the named user's score and returns the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind [`DbErrorKind::NotFound`] if no user has
    /// that name, or another kind if a database error occurs.
    #[instrument(skip(self))]
    pub fn update_user_score(&mut self, name: &str, delta: i64) -> Result<User, DbError> {
        debug!(name = %name, delta, "Adjusting score");

        let user: User = diesel::update(schema::users::table.filter(schema::users::name.eq(name)))
            .set(schema::users::score.eq(schema::users::score + delta))
            .returning(User::as_returning())
            .get_result(self.conn())
            .optional()?
            .ok_or_else(|| {
                DbError::new(DbErrorKind::NotFound, format!("No user named '{}'", name))
            })?;

        info!(user_id = user.id(), score = user.score(), "Score updated");
        Ok(user)
    }
}
