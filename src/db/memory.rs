use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Movie, User, WatchEvent, WatchedMovie};

use super::{MovieStore, StoreError};

/// In-memory store backed by plain vectors.
///
/// Used for tests and for running the server without a database. Vectors
/// rather than maps so that users, movies and watch events keep their
/// insertion order, which the catalog and history contracts rely on.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    movies: Vec<Movie>,
    watches: Vec<WatchEvent>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MovieStore for MemoryStore {
    async fn create_user(&self, user: User) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("Email already registered".to_string()));
        }
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(
                "Username already registered".to_string(),
            ));
        }
        inner.users.push(user);
        Ok(())
    }

    async fn list_users(&self, skip: usize, limit: usize) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_movie(&self, movie: Movie) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.movies.push(movie);
        Ok(())
    }

    async fn list_movies(&self, skip: usize, limit: usize) -> Result<Vec<Movie>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .movies
            .iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.movies.clone())
    }

    async fn find_movie(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn record_watch(&self, event: WatchEvent) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        match inner
            .watches
            .iter_mut()
            .find(|w| w.user_id == event.user_id && w.movie_id == event.movie_id)
        {
            Some(existing) => existing.rating = event.rating,
            None => inner.watches.push(event),
        }
        Ok(())
    }

    async fn watched_movies(&self, user_id: Uuid) -> Result<Vec<WatchedMovie>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .watches
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter_map(|w| {
                inner
                    .movies
                    .iter()
                    .find(|m| m.id == w.movie_id)
                    .map(|movie| WatchedMovie {
                        movie: movie.clone(),
                        rating: w.rating,
                    })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, genre: &str, year: i32) -> Movie {
        Movie::new(title.to_string(), genre.to_string(), year)
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();
        let user = User::new("ada".to_string(), "ada@example.com".to_string());
        store.create_user(user.clone()).await.unwrap();

        let found = store.find_user(user.id).await.unwrap();
        assert_eq!(found, Some(user));
        assert_eq!(store.find_user(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("ada".to_string(), "ada@example.com".to_string()))
            .await
            .unwrap();

        let result = store
            .create_user(User::new("grace".to_string(), "ada@example.com".to_string()))
            .await;
        match result {
            Err(StoreError::Duplicate(msg)) => assert_eq!(msg, "Email already registered"),
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(User::new("ada".to_string(), "ada@example.com".to_string()))
            .await
            .unwrap();

        let result = store
            .create_user(User::new("ada".to_string(), "lovelace@example.com".to_string()))
            .await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_list_movies_paginates_in_insertion_order() {
        let store = MemoryStore::new();
        let movies = vec![
            movie("Heat", "Action", 1995),
            movie("Magnolia", "Drama", 1999),
            movie("Moon", "Sci-Fi", 2009),
        ];
        for m in &movies {
            store.create_movie(m.clone()).await.unwrap();
        }

        let page = store.list_movies(1, 1).await.unwrap();
        assert_eq!(page, vec![movies[1].clone()]);

        let all = store.all_movies().await.unwrap();
        assert_eq!(all, movies);
    }

    #[tokio::test]
    async fn test_record_watch_updates_rating_in_place() {
        let store = MemoryStore::new();
        let user = User::new("ada".to_string(), "ada@example.com".to_string());
        let first = movie("Heat", "Action", 1995);
        let second = movie("Magnolia", "Drama", 1999);
        store.create_user(user.clone()).await.unwrap();
        store.create_movie(first.clone()).await.unwrap();
        store.create_movie(second.clone()).await.unwrap();

        for (movie_id, rating) in [(first.id, 4.0), (second.id, 3.0), (first.id, 5.0)] {
            store
                .record_watch(WatchEvent {
                    user_id: user.id,
                    movie_id,
                    rating,
                })
                .await
                .unwrap();
        }

        // Rewatching updated the rating but kept the original history order
        let watched = store.watched_movies(user.id).await.unwrap();
        assert_eq!(watched.len(), 2);
        assert_eq!(watched[0].movie, first);
        assert_eq!(watched[0].rating, 5.0);
        assert_eq!(watched[1].movie, second);
        assert_eq!(watched[1].rating, 3.0);
    }

    #[tokio::test]
    async fn test_watched_movies_follow_watch_order_not_catalog_order() {
        let store = MemoryStore::new();
        let user = User::new("ada".to_string(), "ada@example.com".to_string());
        let first = movie("Heat", "Action", 1995);
        let second = movie("Magnolia", "Drama", 1999);
        store.create_user(user.clone()).await.unwrap();
        store.create_movie(first.clone()).await.unwrap();
        store.create_movie(second.clone()).await.unwrap();

        for (movie_id, rating) in [(second.id, 4.5), (first.id, 2.0)] {
            store
                .record_watch(WatchEvent {
                    user_id: user.id,
                    movie_id,
                    rating,
                })
                .await
                .unwrap();
        }

        let watched = store.watched_movies(user.id).await.unwrap();
        let titles: Vec<&str> = watched.iter().map(|w| w.movie.title.as_str()).collect();
        assert_eq!(titles, ["Magnolia", "Heat"]);
    }
}
