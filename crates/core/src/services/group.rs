//! Group service.

use scribe_common::AppResult;
use scribe_db::{entities::group, repositories::GroupRepository};

/// Group service for business logic.
///
/// Groups are created through the back office, not through this service;
/// what the application needs is lookup and listing (for the post form's
/// group choices).
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self { group_repo }
    }

    /// All groups, ordered by title.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// A group by slug, or GroupNotFound.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list() {
        let g = group::Model {
            id: "g1".to_string(),
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: "All about cats".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[g]])
                .into_connection(),
        );

        let service = GroupService::new(GroupRepository::new(db));
        let groups = service.list().await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].slug, "cats");
    }
}
