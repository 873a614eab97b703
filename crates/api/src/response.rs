//! API response types.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use scribe_core::Page;
use scribe_db::entities::post;
use serde::Serialize;

/// Post representation shared by every feed and the detail view.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// Post ID.
    pub id: String,
    /// Publication timestamp (RFC 3339).
    pub created_at: String,
    /// Author user ID.
    pub author_id: String,
    /// Group the post is filed under, if any.
    pub group_id: Option<String>,
    /// Post text.
    pub text: String,
    /// Storage key of the attached image, if any.
    pub image: Option<String>,
}

impl From<post::Model> for PostResponse {
    fn from(post: post::Model) -> Self {
        Self {
            id: post.id,
            created_at: post.created_at.to_rfc3339(),
            author_id: post.author_id,
            group_id: post.group_id,
            text: post.text,
            image: post.image,
        }
    }
}

/// One rendered feed page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPageResponse {
    /// Posts on this page.
    pub items: Vec<PostResponse>,
    /// 1-based page number after clamping.
    pub page: u64,
    /// Total number of pages.
    pub total_pages: u64,
    /// Total number of posts in the feed.
    pub total_items: u64,
    /// Configured page size.
    pub page_size: u64,
}

impl From<Page<post::Model>> for FeedPageResponse {
    fn from(page: Page<post::Model>) -> Self {
        let mapped = page.map(PostResponse::from);
        Self {
            items: mapped.items,
            page: mapped.number,
            total_pages: mapped.total_pages,
            total_items: mapped.total_items,
            page_size: mapped.page_size,
        }
    }
}

/// Build a JSON response from pre-rendered bytes.
///
/// The cached global feed replays stored bytes verbatim, so both the first
/// render and every cache hit go through this one constructor.
#[must_use]
pub fn json_bytes(body: Bytes) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// A 404 response in the standard error shape.
#[must_use]
pub fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": {
                "code": "NOT_FOUND",
                "message": message,
            }
        })),
    )
        .into_response()
}
