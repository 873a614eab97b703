//! API endpoints.

mod feeds;
mod follows;
mod posts;

use axum::{
    Json,
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::middleware::AppState;
use crate::response;

/// Create the application router.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(feeds::index))
        .route("/group/{slug}/", get(feeds::group_feed))
        .route("/profile/{username}/", get(feeds::profile))
        .route("/follow/", get(feeds::follow_index))
        .route("/posts/{id}/", get(posts::detail).post(posts::detail_bound))
        .route("/create/", get(posts::create_form).post(posts::create))
        .route("/posts/{id}/edit/", get(posts::edit_form).post(posts::edit))
        .route("/posts/{id}/comment/", post(posts::add_comment))
        .route("/profile/{username}/follow/", post(follows::follow))
        .route("/profile/{username}/unfollow/", post(follows::unfollow))
        .route("/auth/login", get(login_entry))
        .fallback(not_found)
}

/// Path of a user's profile feed.
pub(crate) fn profile_path(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Path of a post's detail view.
pub(crate) fn post_detail_path(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

/// Login entry query.
#[derive(Debug, Deserialize)]
struct LoginQuery {
    next: Option<String>,
}

/// Login entry point.
///
/// Sessions and passwords belong to the external account system; this
/// endpoint only anchors the redirect target and tells callers how to
/// authenticate against this service.
async fn login_entry(Query(query): Query<LoginQuery>) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": "Sign in with the account system and supply a bearer token",
            },
            "next": query.next,
        })),
    )
        .into_response()
}

/// Fallback for unknown routes.
async fn not_found() -> Response {
    response::not_found("No such page")
}
