use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Movie, User, WatchEvent, WatchedMovie};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error types for the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated; the message is client-facing
    #[error("{0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for users, movies and watch history.
///
/// Handlers depend on this trait rather than a concrete backend, so the same
/// API can run against Postgres in production and the in-memory store in
/// tests or local development.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Persists a user. Fails with [`StoreError::Duplicate`] when the email
    /// or username is already taken.
    async fn create_user(&self, user: User) -> Result<(), StoreError>;

    async fn list_users(&self, skip: usize, limit: usize) -> Result<Vec<User>, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn create_movie(&self, movie: Movie) -> Result<(), StoreError>;

    /// Movies in insertion order, paginated
    async fn list_movies(&self, skip: usize, limit: usize) -> Result<Vec<Movie>, StoreError>;

    /// The full catalog in insertion order. Recommendation code treats this
    /// ordering as the catalog order.
    async fn all_movies(&self) -> Result<Vec<Movie>, StoreError>;

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError>;

    /// Inserts or updates the rating for the event's (user, movie) pair.
    /// Rewatching keeps the entry's original position in the history.
    async fn record_watch(&self, event: WatchEvent) -> Result<(), StoreError>;

    /// The user's watch history in the order it was recorded, each movie
    /// paired with its rating
    async fn watched_movies(&self, user_id: Uuid) -> Result<Vec<WatchedMovie>, StoreError>;
}
