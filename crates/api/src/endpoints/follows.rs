//! Follow and unfollow endpoints.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use scribe_common::AppResult;

use super::profile_path;
use crate::{extractors::AuthUser, middleware::AppState};

/// Follow an author. Auth required; idempotent.
pub async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = state.follow_service.follow(&user.id, &username).await?;
    Ok(Redirect::to(&profile_path(&author.username)).into_response())
}

/// Unfollow an author. Auth required; removing an absent edge is a no-op.
pub async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = state.follow_service.unfollow(&user.id, &username).await?;
    Ok(Redirect::to(&profile_path(&author.username)).into_response())
}
