//! Post repository.
//!
//! Feed queries share one ordering contract: publication timestamp
//! descending, ID ascending. IDs are ULIDs, so the ascending tie-break is
//! insertion order within a timestamp.

use std::sync::Arc;

use crate::entities::{Post, post};
use scribe_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn feed_query() -> Select<Post> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
    }

    /// Count all posts.
    pub async fn count_all(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of the global feed (zero-based page index).
    pub async fn find_page(&self, page_index: u64, page_size: u64) -> AppResult<Vec<post::Model>> {
        Self::feed_query()
            .paginate(self.db.as_ref(), page_size)
            .fetch_page(page_index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts filed under a group.
    pub async fn count_by_group(&self, group_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::GroupId.eq(group_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of a group feed (zero-based page index).
    pub async fn find_page_by_group(
        &self,
        group_id: &str,
        page_index: u64,
        page_size: u64,
    ) -> AppResult<Vec<post::Model>> {
        Self::feed_query()
            .filter(post::Column::GroupId.eq(group_id))
            .paginate(self.db.as_ref(), page_size)
            .fetch_page(page_index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts written by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of an author's feed (zero-based page index).
    pub async fn find_page_by_author(
        &self,
        author_id: &str,
        page_index: u64,
        page_size: u64,
    ) -> AppResult<Vec<post::Model>> {
        Self::feed_query()
            .filter(post::Column::AuthorId.eq(author_id))
            .paginate(self.db.as_ref(), page_size)
            .fetch_page(page_index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts written by any of the given authors.
    pub async fn count_by_authors(&self, author_ids: &[String]) -> AppResult<u64> {
        if author_ids.is_empty() {
            return Ok(0);
        }

        Post::find()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch one page of posts by any of the given authors (follow feed).
    pub async fn find_page_by_authors(
        &self,
        author_ids: &[String],
        page_index: u64,
        page_size: u64,
    ) -> AppResult<Vec<post::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        Self::feed_query()
            .filter(post::Column::AuthorId.is_in(author_ids.to_vec()))
            .paginate(self.db.as_ref(), page_size)
            .fetch_page(page_index)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
