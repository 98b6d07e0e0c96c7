//! Movie catalog and watch history backend that recommends unseen movies by
//! clustering the catalog on genre and release year.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
