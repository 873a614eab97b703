//! Post service.

use std::sync::Arc;

use scribe_common::{AppError, AppResult, IdGenerator, StorageBackend, generate_storage_key};
use scribe_db::{
    entities::{comment, post},
    repositories::{CommentRepository, GroupRepository, PostRepository},
};
use sea_orm::Set;
use validator::Validate;

/// Namespace uploaded post images live under, below the media root.
const IMAGE_NAMESPACE: &str = "posts";

/// An uploaded image file, as received from the form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Original file name, used for the extension of the storage key.
    pub file_name: String,
    /// MIME content type as declared by the client.
    pub content_type: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// Input for creating or editing a post.
///
/// There is deliberately no author field: the author is always the
/// authenticated actor, never client-supplied.
#[derive(Debug, Validate)]
pub struct PostInput {
    /// Post text, required.
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,

    /// Group to file the post under, if any. Must reference an existing
    /// group.
    pub group_id: Option<String>,

    /// Optional image attachment.
    pub image: Option<ImageUpload>,
}

/// Outcome of an edit attempt.
pub enum EditOutcome {
    /// The actor owns the post and the row was updated.
    Updated(post::Model),
    /// The actor is not the author. Nothing was changed; the caller
    /// redirects away without surfacing an error.
    Denied,
}

/// A post with everything its detail view shows.
pub struct PostDetail {
    /// The post itself.
    pub post: post::Model,
    /// Its comments, in insertion order.
    pub comments: Vec<comment::Model>,
    /// The author's total post count.
    pub post_count: u64,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            comment_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new post authored by `author_id`.
    ///
    /// The publication timestamp is stamped here, in the same write that
    /// creates the row, and never changes afterwards.
    pub async fn create(&self, author_id: &str, input: PostInput) -> AppResult<post::Model> {
        self.validate_input(&input).await?;

        let image_key = match input.image {
            Some(ref upload) => Some(self.store_image(upload).await?),
            None => None,
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            group_id: Set(input.group_id),
            text: Set(input.text),
            image: Set(image_key),
            created_at: Set(chrono::Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, author_id = %post.author_id, "Created post");
        Ok(post)
    }

    /// Edit an existing post.
    ///
    /// Only the author may change the row. Anyone else gets
    /// [`EditOutcome::Denied`] with no mutation and no error. The ownership
    /// check runs before validation, so a non-author never sees field
    /// errors either.
    pub async fn edit(
        &self,
        post_id: &str,
        actor_id: &str,
        input: PostInput,
    ) -> AppResult<EditOutcome> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != actor_id {
            tracing::debug!(post_id = %post.id, actor_id, "Edit denied, not the author");
            return Ok(EditOutcome::Denied);
        }

        self.validate_input(&input).await?;

        let image_key = match input.image {
            Some(ref upload) => Some(self.store_image(upload).await?),
            None => post.image.clone(),
        };

        let mut model: post::ActiveModel = post.into();
        model.text = Set(input.text);
        model.group_id = Set(input.group_id);
        model.image = Set(image_key);

        let updated = self.post_repo.update(model).await?;
        tracing::debug!(post_id = %updated.id, "Updated post");
        Ok(EditOutcome::Updated(updated))
    }

    /// Everything the post-detail view needs.
    pub async fn detail(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let comments = self.comment_repo.find_by_post(&post.id).await?;
        let post_count = self.post_repo.count_by_author(&post.author_id).await?;

        Ok(PostDetail {
            post,
            comments,
            post_count,
        })
    }

    /// Field validation shared by create and edit.
    async fn validate_input(&self, input: &PostInput) -> AppResult<()> {
        input.validate()?;

        if input.text.trim().is_empty() {
            return Err(AppError::Validation("text: Text is required".to_string()));
        }

        if let Some(ref group_id) = input.group_id
            && self.group_repo.find_by_id(group_id).await?.is_none()
        {
            return Err(AppError::Validation(format!("group: unknown group {group_id}")));
        }

        Ok(())
    }

    /// Validate and persist an uploaded image, returning its storage key.
    async fn store_image(&self, upload: &ImageUpload) -> AppResult<String> {
        image::guess_format(&upload.data)
            .map_err(|_| AppError::Validation("image: unrecognized image format".to_string()))?;

        let key = generate_storage_key(IMAGE_NAMESPACE, &upload.file_name);
        self.storage
            .upload(&key, &upload.data, &upload.content_type)
            .await?;
        Ok(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_common::LocalStorage;
    use scribe_db::entities::group;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn test_storage() -> Arc<dyn StorageBackend> {
        Arc::new(LocalStorage::new(
            std::env::temp_dir().join("scribe-test-media"),
            "/media".to_string(),
        ))
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> PostService {
        PostService::new(
            PostRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            CommentRepository::new(db),
            test_storage(),
        )
    }

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: "original text".to_string(),
            image: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_blank_text_is_validation_error() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let input = PostInput {
            text: "   ".to_string(),
            group_id: None,
            image: None,
        };
        let result = service.create("u1", input).await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("text")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_create_unknown_group_is_validation_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let input = PostInput {
            text: "Hello".to_string(),
            group_id: Some("g-missing".to_string()),
            image: None,
        };
        let result = service.create("u1", input).await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("group")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_image_upload() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = service_with(db);

        let input = PostInput {
            text: "Hello".to_string(),
            group_id: None,
            image: Some(ImageUpload {
                file_name: "notes.txt".to_string(),
                content_type: "text/plain".to_string(),
                data: b"definitely not pixels".to_vec(),
            }),
        };
        let result = service.create("u1", input).await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("image")),
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_edit_by_non_author_is_denied_without_mutation() {
        // Only the post lookup is answered; an UPDATE would fail the mock.
        let post = create_test_post("p1", "owner");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post]])
                .into_connection(),
        );
        let service = service_with(db);

        let input = PostInput {
            text: "hijacked".to_string(),
            group_id: None,
            image: None,
        };
        let outcome = service.edit("p1", "intruder", input).await.unwrap();

        assert!(matches!(outcome, EditOutcome::Denied));
    }

    #[tokio::test]
    async fn test_edit_missing_post_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let input = PostInput {
            text: "anything".to_string(),
            group_id: None,
            image: None,
        };
        let result = service.edit("gone", "u1", input).await;

        match result {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "gone"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_detail_missing_post_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );
        let service = service_with(db);

        let result = service.detail("gone").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
