//! Follow service.

use scribe_common::{AppError, AppResult, IdGenerator};
use scribe_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow an author by username, idempotently.
    ///
    /// An existing edge is left untouched; there is no duplicate-edge
    /// error. Self-follow is rejected here in the service, not left to the
    /// storage constraints. Returns the resolved author so the handler can
    /// redirect to their profile.
    pub async fn follow(&self, user_id: &str, username: &str) -> AppResult<user::Model> {
        let author = self.user_repo.get_by_username(username).await?;

        if author.id == user_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        if self.follow_repo.find_by_pair(user_id, &author.id).await?.is_none() {
            let model = follow::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                author_id: Set(author.id.clone()),
                created_at: Set(chrono::Utc::now().into()),
            };
            self.follow_repo.create(model).await?;
            tracing::debug!(user_id, author_id = %author.id, "Created follow edge");
        }

        Ok(author)
    }

    /// Unfollow an author by username, idempotently.
    ///
    /// Removing an absent edge is a no-op, never an error. Returns the
    /// resolved author for the redirect.
    pub async fn unfollow(&self, user_id: &str, username: &str) -> AppResult<user::Model> {
        let author = self.user_repo.get_by_username(username).await?;

        self.follow_repo.delete_by_pair(user_id, &author.id).await?;
        tracing::debug!(user_id, author_id = %author.id, "Removed follow edge if present");

        Ok(author)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            name: None,
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_follow(id: &str, user_id: &str, author_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> FollowService {
        FollowService::new(
            FollowRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_follow_unknown_username_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let result = service_with(db).follow("u1", "ghost").await;

        match result {
            Err(AppError::UserNotFound(name)) => assert_eq!(name, "ghost"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let me = create_test_user("u1", "me");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[me]])
                .into_connection(),
        );

        let result = service_with(db).follow("u1", "me").await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains("Cannot follow yourself"));
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_follow_existing_edge_is_idempotent() {
        // Lookup answers with an existing edge; an INSERT would fail the
        // mock, so Ok proves no second edge was written.
        let author = create_test_user("u2", "author");
        let edge = create_test_follow("f1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![author]])
                .append_query_results([vec![edge]])
                .into_connection(),
        );

        let result = service_with(db).follow("u1", "author").await.unwrap();

        assert_eq!(result.id, "u2");
    }

    #[tokio::test]
    async fn test_unfollow_absent_edge_is_noop() {
        let author = create_test_user("u2", "author");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![author]])
                .append_query_results([Vec::<follow::Model>::new()])
                .into_connection(),
        );

        let result = service_with(db).unfollow("u1", "author").await;

        assert!(result.is_ok());
    }
}
