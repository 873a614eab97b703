//! Post endpoints: detail, create, edit, and comment submission.

use axum::{
    Form, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use scribe_common::{AppError, AppResult};
use scribe_core::{EditOutcome, ImageUpload, PostInput};
use scribe_db::entities::comment;
use serde::{Deserialize, Serialize};

use super::feeds::GroupResponse;
use super::{post_detail_path, profile_path};
use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::PostResponse,
};

/// Comment representation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    /// Comment ID.
    pub id: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Comment author user ID.
    pub author_id: String,
    /// Comment text.
    pub text: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            created_at: comment.created_at.to_rfc3339(),
            author_id: comment.author_id,
            text: comment.text,
        }
    }
}

/// The comment-submission form as the detail view renders it.
#[derive(Debug, Serialize)]
pub struct CommentFormResponse {
    /// Bound text value; empty for a fresh form.
    pub text: String,
}

/// Post detail response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    /// The post itself.
    pub post: PostResponse,
    /// Comments in insertion order.
    pub comments: Vec<CommentResponse>,
    /// The author's total post count.
    pub post_count: u64,
    /// The comment form, empty or bound.
    pub comment_form: CommentFormResponse,
}

/// Submitted comment form data.
#[derive(Debug, Default, Deserialize)]
pub struct CommentFormData {
    /// Comment text.
    pub text: Option<String>,
}

/// Submitted post form values, echoed back on validation failure.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PostFormValues {
    /// Post text.
    pub text: String,
    /// Selected group ID, if any.
    pub group: Option<String>,
}

async fn render_detail(
    state: &AppState,
    post_id: &str,
    bound_text: String,
) -> AppResult<Json<PostDetailResponse>> {
    let detail = state.post_service.detail(post_id).await?;

    Ok(Json(PostDetailResponse {
        post: detail.post.into(),
        comments: detail.comments.into_iter().map(Into::into).collect(),
        post_count: detail.post_count,
        comment_form: CommentFormResponse { text: bound_text },
    }))
}

/// Post detail. No auth gate; anonymous viewers included.
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PostDetailResponse>> {
    render_detail(&state, &id, String::new()).await
}

/// Post detail with a bound comment form (POST renders the same view).
pub async fn detail_bound(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CommentFormData>,
) -> AppResult<Json<PostDetailResponse>> {
    render_detail(&state, &id, form.text.unwrap_or_default()).await
}

/// Blank post form with the available group choices.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFormResponse {
    /// Current form values.
    pub values: PostFormValues,
    /// Groups the post can be filed under.
    pub groups: Vec<GroupResponse>,
}

/// Render the create form. Auth required.
pub async fn create_form(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<PostFormResponse>> {
    let groups = state.group_service.list().await?;

    Ok(Json(PostFormResponse {
        values: PostFormValues::default(),
        groups: groups.into_iter().map(Into::into).collect(),
    }))
}

/// Read the multipart post form: text, optional group, optional image.
async fn parse_post_form(
    mut multipart: Multipart,
) -> AppResult<(PostFormValues, Option<ImageUpload>)> {
    let mut values = PostFormValues::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => {
                values.text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "group" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !value.is_empty() {
                    values.group = Some(value);
                }
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // An empty file part means no upload was selected.
                if !data.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((values, image))
}

/// The re-render contract: field errors plus the submitted values.
fn form_error_response(message: &str, values: &PostFormValues) -> Response {
    let mut fields = serde_json::Map::new();
    for line in message.split('\n') {
        let (field, text) = line.split_once(": ").unwrap_or(("__all__", line));
        match fields.get_mut(field).and_then(serde_json::Value::as_array_mut) {
            Some(messages) => messages.push(serde_json::Value::String(text.to_string())),
            None => {
                fields.insert(field.to_string(), serde_json::json!([text]));
            }
        }
    }

    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "error": {
                "code": "VALIDATION_ERROR",
                "message": message,
            },
            "form": {
                "errors": fields,
                "values": values,
            }
        })),
    )
        .into_response()
}

/// Create a post. Auth required.
///
/// The author is always the authenticated actor; nothing in the form can
/// set it. On success, redirects to the actor's profile feed.
pub async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (values, image) = parse_post_form(multipart).await?;

    let input = PostInput {
        text: values.text.clone(),
        group_id: values.group.clone(),
        image,
    };

    match state.post_service.create(&user.id, input).await {
        Ok(_) => Ok(Redirect::to(&profile_path(&user.username)).into_response()),
        Err(AppError::Validation(message)) => Ok(form_error_response(&message, &values)),
        Err(err) => Err(err),
    }
}

/// Render the edit form, prefilled. Auth required; author only.
///
/// A non-author is redirected to the detail view with no error shown,
/// the same silent denial the POST path applies.
pub async fn edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let detail = state.post_service.detail(&id).await?;

    if detail.post.author_id != user.id {
        return Ok(Redirect::to(&post_detail_path(&id)).into_response());
    }

    let groups = state.group_service.list().await?;
    let form = PostFormResponse {
        values: PostFormValues {
            text: detail.post.text,
            group: detail.post.group_id,
        },
        groups: groups.into_iter().map(Into::into).collect(),
    };

    Ok(Json(form).into_response())
}

/// Apply an edit. Auth required; author only.
pub async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (values, image) = parse_post_form(multipart).await?;

    let input = PostInput {
        text: values.text.clone(),
        group_id: values.group.clone(),
        image,
    };

    match state.post_service.edit(&id, &user.id, input).await {
        // Denied and updated both land on the detail view; a non-author
        // gets no distinct signal that nothing happened.
        Ok(EditOutcome::Updated(_) | EditOutcome::Denied) => {
            Ok(Redirect::to(&post_detail_path(&id)).into_response())
        }
        Err(AppError::Validation(message)) => Ok(form_error_response(&message, &values)),
        Err(err) => Err(err),
    }
}

/// Add a comment. Auth required.
///
/// Validation failures are swallowed: the response is the same redirect to
/// the detail view whether or not a comment was created. Only a missing
/// post surfaces as an error.
pub async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CommentFormData>,
) -> AppResult<Response> {
    let text = form.text.unwrap_or_default();

    match state.comment_service.add(&id, &user.id, &text).await {
        Ok(_) | Err(AppError::Validation(_)) => {
            Ok(Redirect::to(&post_detail_path(&id)).into_response())
        }
        Err(err) => Err(err),
    }
}
