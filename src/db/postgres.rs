use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Movie, User, WatchEvent, WatchedMovie};

use super::{MovieStore, StoreError};

/// PostgreSQL-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects to the database, runs pending migrations, and returns the
    /// store.
    ///
    /// The pool automatically manages connection lifecycle and limits.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl MovieStore for PgStore {
    async fn create_user(&self, user: User) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO users (id, username, email, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn list_users(&self, skip: usize, limit: usize) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email FROM users ORDER BY created_at LIMIT $1 OFFSET $2",
        )
        .bind(to_i64(limit))
        .bind(to_i64(skip))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_movie(&self, movie: Movie) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO movies (id, title, genre, year, created_at) VALUES ($1, $2, $3, $4, $5)")
            .bind(movie.id)
            .bind(&movie.title)
            .bind(&movie.genre)
            .bind(movie.year)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_movies(&self, skip: usize, limit: usize) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(
            "SELECT id, title, genre, year FROM movies ORDER BY created_at LIMIT $1 OFFSET $2",
        )
        .bind(to_i64(limit))
        .bind(to_i64(skip))
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    async fn all_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let movies =
            sqlx::query_as::<_, Movie>("SELECT id, title, genre, year FROM movies ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(movies)
    }

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let movie =
            sqlx::query_as::<_, Movie>("SELECT id, title, genre, year FROM movies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(movie)
    }

    async fn record_watch(&self, event: WatchEvent) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO watch_history (user_id, movie_id, rating, watched_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET rating = EXCLUDED.rating",
        )
        .bind(event.user_id)
        .bind(event.movie_id)
        .bind(event.rating)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn watched_movies(&self, user_id: Uuid) -> Result<Vec<WatchedMovie>, StoreError> {
        let watched = sqlx::query_as::<_, WatchedMovie>(
            "SELECT m.id, m.title, m.genre, m.year, w.rating
             FROM watch_history w
             JOIN movies m ON m.id = w.movie_id
             WHERE w.user_id = $1
             ORDER BY w.watched_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(watched)
    }
}

/// Translates unique-constraint violations into client-facing duplicate
/// errors, everything else into a plain database error
fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("users_email_key") => "Email already registered",
                Some("users_username_key") => "Username already registered",
                _ => "Record already exists",
            };
            return StoreError::Duplicate(message.to_string());
        }
    }
    StoreError::Database(err)
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
