//! HTTP layer for scribe.
//!
//! This crate binds the core services to the web surface:
//!
//! - **Endpoints**: feeds, post mutations, comments, follow/unfollow
//! - **Extractors**: authenticated and optional viewers
//! - **Middleware**: bearer-token authentication, shared state
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
