use crate::models::{Drink, NewDrink};
use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    types::Json,
};
use std::{str::FromStr, sync::Arc, time::Duration};
use thiserror::Error;

/// RepositoryError
///
/// Failures surfaced by the persistence layer. Callers decide which HTTP status
/// each kind collapses to.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The `title` unique constraint rejected the write.
    #[error("a drink titled '{0}' already exists")]
    DuplicateTitle(String),
    /// Any other storage failure, including a recipe column that no longer decodes.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// The persistence contract for drinks. Handlers only see this trait, which
/// lets the tests swap in an in-memory mock.
///
/// There is no concurrency control: concurrent writers to the same row are not
/// coordinated and the last write wins.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError>;
    async fn get(&self, id: i64) -> Result<Option<Drink>, RepositoryError>;
    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepositoryError>;
    /// Replaces title and recipe wholesale. `None` if the row is gone.
    async fn update(&self, drink: &Drink) -> Result<Option<Drink>, RepositoryError>;
    /// Returns `true` when a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The `Repository` implementation backed by a SQLite database through sqlx.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a new repository instance using an initialized connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// connect
    ///
    /// Opens a pool for `database_url`. An in-memory database lives only as long
    /// as its connection, so memory URLs get one connection that is never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(options)
                .await?
        };

        Ok(Self::new(pool))
    }

    /// drop_and_create_all
    ///
    /// Unconditionally drops and recreates the `drink` table. Run once at startup,
    /// so no drink survives a restart.
    pub async fn drop_and_create_all(&self) -> Result<(), RepositoryError> {
        sqlx::query("DROP TABLE IF EXISTS drink")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE drink (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                recipe TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("drink table recreated");
        Ok(())
    }
}

/// Maps a unique-constraint violation on write to `DuplicateTitle`.
fn write_error(e: sqlx::Error, title: &str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return RepositoryError::DuplicateTitle(title.to_string());
        }
    }
    RepositoryError::Database(e)
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, RepositoryError> {
        let drinks = sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drink ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(drinks)
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, RepositoryError> {
        let drink = sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drink WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(drink)
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepositoryError> {
        sqlx::query_as::<_, Drink>(
            "INSERT INTO drink (title, recipe) VALUES (?, ?) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(Json(&drink.recipe))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &drink.title))
    }

    async fn update(&self, drink: &Drink) -> Result<Option<Drink>, RepositoryError> {
        sqlx::query_as::<_, Drink>(
            "UPDATE drink SET title = ?, recipe = ? WHERE id = ? RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(Json(&drink.recipe))
        .bind(drink.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, &drink.title))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM drink WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
