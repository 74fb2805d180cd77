//! Server crate for the product rating recommender.
//!
//! Serves the single-page UI over HTTP. Every request re-runs the cached
//! pipeline with the current query values and renders the result as HTML.

pub mod config;
pub mod error;
pub mod render;
pub mod routes;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::{AppState, router, serve};
