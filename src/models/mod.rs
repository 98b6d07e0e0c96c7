use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Movie {
    /// Unique identifier for the movie
    pub id: Uuid,
    /// Display title
    pub title: String,
    /// Categorical genre label (e.g., "Action")
    pub genre: String,
    /// Release year
    pub year: i32,
}

impl Movie {
    /// Creates a new movie with a generated id
    pub fn new(title: String, genre: String, year: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            genre,
            year,
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Display name, unique across users
    pub username: String,
    /// Email address, unique across users
    pub email: String,
}

impl User {
    /// Creates a new user with a generated id
    pub fn new(username: String, email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
        }
    }
}

/// A single watch-history entry. Each (user, movie) pair carries at most one
/// rating; rewatching a movie replaces the old rating without moving the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    /// Rating the user gave the movie
    pub rating: f64,
}

/// A watched movie joined with the rating the user gave it
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WatchedMovie {
    #[sqlx(flatten)]
    pub movie: Movie,
    pub rating: f64,
}
