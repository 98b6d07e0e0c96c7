use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{Movie, User, WatchEvent};
use crate::services::ClusterRecommender;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub watched_movies: Vec<MovieResponse>,
}

impl UserResponse {
    fn new(user: &User, watched_movies: Vec<MovieResponse>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            watched_movies,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub genre: String,
    pub year: i32,
}

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub genre: String,
    pub year: i32,
}

impl From<&Movie> for MovieResponse {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            genre: movie.genre.clone(),
            year: movie.year,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WatchRequest {
    pub rating: f64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    5
}

// Handlers

/// Welcome message with pointers to the main endpoints
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Cinematch API",
        "endpoints": {
            "users": "/users",
            "movies": "/movies",
            "recommendations": "/users/{user_id}/recommendations"
        }
    }))
}

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = User::new(request.username, request.email);
    let response = UserResponse::new(&user, Vec::new());

    state.store.create_user(user).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List users together with the movies they have watched
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.store.list_users(query.skip, query.limit).await?;

    let mut responses = Vec::with_capacity(users.len());
    for user in &users {
        let watched = state
            .store
            .watched_movies(user.id)
            .await?
            .iter()
            .map(|w| MovieResponse::from(&w.movie))
            .collect();
        responses.push(UserResponse::new(user, watched));
    }

    Ok(Json(responses))
}

/// Add a movie to the catalog
pub async fn create_movie(
    State(state): State<AppState>,
    Json(request): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<MovieResponse>)> {
    let movie = Movie::new(request.title, request.genre, request.year);
    let response = MovieResponse::from(&movie);

    state.store.create_movie(movie).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List the movie catalog in insertion order
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    let movies = state.store.list_movies(query.skip, query.limit).await?;
    Ok(Json(movies.iter().map(MovieResponse::from).collect()))
}

/// Record that a user watched a movie, with a rating. Watching the same
/// movie again just updates the rating.
pub async fn record_watch(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<WatchRequest>,
) -> AppResult<Json<Value>> {
    if state.store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    if state.store.find_movie(movie_id).await?.is_none() {
        return Err(AppError::NotFound("Movie not found".to_string()));
    }

    state
        .store
        .record_watch(WatchEvent {
            user_id,
            movie_id,
            rating: request.rating,
        })
        .await?;

    Ok(Json(json!({ "status": "success" })))
}

/// Recommend unwatched movies from the catalog cluster the user's watch
/// history lands in most often
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RecommendQuery>,
) -> AppResult<Json<Vec<MovieResponse>>> {
    if state.store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let history: Vec<Movie> = state
        .store
        .watched_movies(user_id)
        .await?
        .into_iter()
        .map(|w| w.movie)
        .collect();
    if history.is_empty() {
        return Err(AppError::InvalidInput("No watch history found".to_string()));
    }

    let catalog = state.store.all_movies().await?;

    // A fresh recommender per request: the fit and the lookup run against the
    // same catalog snapshot, and concurrent requests share nothing
    let mut recommender = ClusterRecommender::new(state.clusters);
    recommender.fit(&catalog)?;
    let recommendations = recommender.recommend(&history, &catalog, query.count)?;

    tracing::info!(
        request_id = %request_id,
        history_len = history.len(),
        catalog_len = catalog.len(),
        clusters = recommender.cluster_count(),
        returned = recommendations.len(),
        "Recommendations computed"
    );

    Ok(Json(
        recommendations.iter().map(MovieResponse::from).collect(),
    ))
}
