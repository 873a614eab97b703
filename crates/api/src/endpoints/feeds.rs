//! Feed endpoints: global, group, profile, and follow feeds.

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    response::Response,
};
use bytes::Bytes;
use scribe_common::AppResult;
use scribe_core::parse_page;
use scribe_db::entities::{group, user};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{FeedPageResponse, json_bytes},
};

/// Feed query parameters.
///
/// `page` is taken as a raw string so malformed values fall back to page 1
/// instead of rejecting the request, per the paginator contract.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Requested 1-based page number.
    pub page: Option<String>,
}

/// Group representation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    /// Group ID.
    pub id: String,
    /// Group title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Group description.
    pub description: String,
}

impl From<group::Model> for GroupResponse {
    fn from(group: group::Model) -> Self {
        Self {
            id: group.id,
            title: group.title,
            slug: group.slug,
            description: group.description,
        }
    }
}

/// Author representation on the profile feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Display name, if set.
    pub name: Option<String>,
}

impl From<user::Model> for AuthorResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

/// Group feed response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupFeedResponse {
    /// The group being browsed.
    pub group: GroupResponse,
    /// The requested page of its posts.
    pub posts: FeedPageResponse,
}

/// Profile feed response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// The author being browsed.
    pub author: AuthorResponse,
    /// Whether the current viewer follows this author.
    pub following: bool,
    /// The author's total post count.
    pub post_count: u64,
    /// The requested page of the author's posts.
    pub posts: FeedPageResponse,
}

/// Global feed.
///
/// Served through the page cache: within the configured TTL every request
/// for the same route-plus-query gets the bytes the first request
/// rendered, regardless of row changes in between.
pub async fn index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<FeedQuery>,
) -> AppResult<Response> {
    let key = uri.to_string();
    if let Some(body) = state.page_cache.get(&key).await {
        tracing::debug!(key = %key, "Global feed served from page cache");
        return Ok(json_bytes(body));
    }

    let page = state
        .feed_service
        .global(parse_page(query.page.as_deref()))
        .await?;
    let body = Bytes::from(serde_json::to_vec(&FeedPageResponse::from(page))?);

    state.page_cache.put(key, body.clone()).await;
    Ok(json_bytes(body))
}

/// Group feed.
pub async fn group_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<GroupFeedResponse>> {
    let feed = state
        .feed_service
        .group(&slug, parse_page(query.page.as_deref()))
        .await?;

    Ok(Json(GroupFeedResponse {
        group: feed.group.into(),
        posts: feed.posts.into(),
    }))
}

/// Author profile feed.
pub async fn profile(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ProfileResponse>> {
    let viewer_id = viewer.as_ref().map(|user| user.id.as_str());
    let feed = state
        .feed_service
        .profile(&username, viewer_id, parse_page(query.page.as_deref()))
        .await?;

    Ok(Json(ProfileResponse {
        author: feed.author.into(),
        following: feed.following,
        post_count: feed.post_count,
        posts: feed.posts.into(),
    }))
}

/// Follow feed: posts from authors the viewer follows. Auth required.
pub async fn follow_index(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedPageResponse>> {
    let page = state
        .feed_service
        .following(&viewer.id, parse_page(query.page.as_deref()))
        .await?;

    Ok(Json(page.into()))
}
