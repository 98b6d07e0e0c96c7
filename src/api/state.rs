use std::sync::Arc;

use crate::db::MovieStore;

/// Shared application state.
///
/// Holds the storage backend and the recommender configuration. There is no
/// shared model here: each recommendation request fits its own recommender
/// from a snapshot of the catalog, so requests never observe each other's
/// fit state.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend for users, movies and watch history
    pub store: Arc<dyn MovieStore>,
    /// Cluster count for per-request recommenders
    pub clusters: usize,
}

impl AppState {
    /// Creates application state around a storage backend
    pub fn new(store: Arc<dyn MovieStore>, clusters: usize) -> Self {
        Self { store, clusters }
    }
}
