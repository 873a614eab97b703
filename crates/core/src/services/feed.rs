//! Feed composition service.
//!
//! Builds the four paginated post feeds (global, group, profile, follow)
//! over one ordering contract: publication timestamp descending, insertion
//! order for ties. All feeds share the configured page size.

use crate::pagination::{Page, clamp_page, total_pages};
use scribe_common::AppResult;
use scribe_db::{
    entities::{group, post, user},
    repositories::{FollowRepository, GroupRepository, PostRepository, UserRepository},
};

/// Feed composition service.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    user_repo: UserRepository,
    follow_repo: FollowRepository,
    page_size: u64,
}

/// A group feed page together with the group itself.
pub struct GroupFeed {
    /// The resolved group.
    pub group: group::Model,
    /// The requested page of its posts.
    pub posts: Page<post::Model>,
}

/// A profile feed page together with author context.
pub struct ProfileFeed {
    /// The resolved author.
    pub author: user::Model,
    /// The requested page of the author's posts.
    pub posts: Page<post::Model>,
    /// Whether the current viewer follows this author (false for anonymous).
    pub following: bool,
    /// The author's total post count.
    pub post_count: u64,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        user_repo: UserRepository,
        follow_repo: FollowRepository,
        page_size: u64,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            user_repo,
            follow_repo,
            page_size,
        }
    }

    /// The configured feed page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    fn assemble(
        &self,
        items: Vec<post::Model>,
        number: u64,
        pages: u64,
        total_items: u64,
    ) -> Page<post::Model> {
        Page {
            items,
            number,
            total_pages: pages,
            total_items,
            page_size: self.page_size,
        }
    }

    /// Global feed: every post, newest first.
    pub async fn global(&self, requested_page: u64) -> AppResult<Page<post::Model>> {
        let total_items = self.post_repo.count_all().await?;
        let pages = total_pages(total_items, self.page_size);
        let number = clamp_page(requested_page, pages);

        let items = self.post_repo.find_page(number - 1, self.page_size).await?;
        Ok(self.assemble(items, number, pages, total_items))
    }

    /// Group feed: posts filed under the group with the given slug.
    pub async fn group(&self, slug: &str, requested_page: u64) -> AppResult<GroupFeed> {
        let group = self.group_repo.get_by_slug(slug).await?;

        let total_items = self.post_repo.count_by_group(&group.id).await?;
        let pages = total_pages(total_items, self.page_size);
        let number = clamp_page(requested_page, pages);

        let items = self
            .post_repo
            .find_page_by_group(&group.id, number - 1, self.page_size)
            .await?;
        let posts = self.assemble(items, number, pages, total_items);

        Ok(GroupFeed { group, posts })
    }

    /// Profile feed: posts by the given author, plus viewer context.
    pub async fn profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
        requested_page: u64,
    ) -> AppResult<ProfileFeed> {
        let author = self.user_repo.get_by_username(username).await?;

        let post_count = self.post_repo.count_by_author(&author.id).await?;
        let pages = total_pages(post_count, self.page_size);
        let number = clamp_page(requested_page, pages);

        let items = self
            .post_repo
            .find_page_by_author(&author.id, number - 1, self.page_size)
            .await?;
        let posts = self.assemble(items, number, pages, post_count);

        let following = match viewer_id {
            Some(viewer) => self.follow_repo.is_following(viewer, &author.id).await?,
            None => false,
        };

        Ok(ProfileFeed {
            author,
            posts,
            following,
            post_count,
        })
    }

    /// Follow feed: posts by every author the viewer follows.
    pub async fn following(&self, viewer_id: &str, requested_page: u64) -> AppResult<Page<post::Model>> {
        let author_ids = self.follow_repo.find_followed_author_ids(viewer_id).await?;
        if author_ids.is_empty() {
            return Ok(Page::empty(self.page_size));
        }

        let total_items = self.post_repo.count_by_authors(&author_ids).await?;
        let pages = total_pages(total_items, self.page_size);
        let number = clamp_page(requested_page, pages);

        let items = self
            .post_repo
            .find_page_by_authors(&author_ids, number - 1, self.page_size)
            .await?;
        Ok(self.assemble(items, number, pages, total_items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use scribe_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: format!("post {id}"),
            image: None,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> FeedService {
        FeedService::new(
            PostRepository::new(Arc::clone(&db)),
            GroupRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            FollowRepository::new(db),
            10,
        )
    }

    #[tokio::test]
    async fn test_global_thirteen_posts_two_pages() {
        let page_two: Vec<post::Model> = (10..13)
            .map(|i| create_test_post(&format!("p{i}"), "u1"))
            .collect();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![count_row(13)]])
                .append_query_results([page_two])
                .into_connection(),
        );

        let page = service_with(db).global(2).await.unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_items, 13);
        assert_eq!(page.items.len(), 3);
    }

    #[tokio::test]
    async fn test_global_page_overflow_clamps_to_last() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![count_row(13)]])
                .append_query_results([vec![create_test_post("p12", "u1")]])
                .into_connection(),
        );

        let page = service_with(db).global(99).await.unwrap();

        assert_eq!(page.number, 2);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_global_empty_table_is_one_empty_page() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![count_row(0)]])
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let page = service_with(db).global(1).await.unwrap();

        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_group_feed_unknown_slug_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<group::Model>::new()])
                .into_connection(),
        );

        let result = service_with(db).group("missing", 1).await;

        match result {
            Err(AppError::GroupNotFound(slug)) => assert_eq!(slug, "missing"),
            _ => panic!("Expected GroupNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_profile_anonymous_viewer_not_following() {
        let author = user::Model {
            id: "u2".to_string(),
            username: "author".to_string(),
            username_lower: "author".to_string(),
            name: None,
            token: None,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![author]])
                .append_query_results([vec![count_row(1)]])
                .append_query_results([vec![create_test_post("p1", "u2")]])
                .into_connection(),
        );

        let profile = service_with(db).profile("author", None, 1).await.unwrap();

        assert!(!profile.following);
        assert_eq!(profile.post_count, 1);
        assert_eq!(profile.posts.items.len(), 1);
    }

    #[tokio::test]
    async fn test_follow_feed_without_edges_is_empty() {
        // Only the edge lookup runs; the post table is never queried.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<scribe_db::entities::follow::Model>::new()])
                .into_connection(),
        );

        let page = service_with(db).following("u1", 1).await.unwrap();

        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }
}
