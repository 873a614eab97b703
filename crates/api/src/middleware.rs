//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use scribe_common::PageCache;
use scribe_core::{
    CommentService, FeedService, FollowService, GroupService, PostService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Identity lookup.
    pub user_service: UserService,
    /// Feed composition.
    pub feed_service: FeedService,
    /// Post create/edit/detail.
    pub post_service: PostService,
    /// Comment add.
    pub comment_service: CommentService,
    /// Follow/unfollow.
    pub follow_service: FollowService,
    /// Group listing and lookup.
    pub group_service: GroupService,
    /// Time-boxed cache for rendered global-feed pages.
    pub page_cache: PageCache,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token to a user and attaches it to the request
/// extensions; extractors downstream decide whether an anonymous caller
/// is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
