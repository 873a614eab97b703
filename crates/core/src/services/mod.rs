//! Business logic services.

pub mod comment;
pub mod feed;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::CommentService;
pub use feed::{FeedService, GroupFeed, ProfileFeed};
pub use follow::FollowService;
pub use group::GroupService;
pub use post::{EditOutcome, ImageUpload, PostDetail, PostInput, PostService};
pub use user::UserService;
