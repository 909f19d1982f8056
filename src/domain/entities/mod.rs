pub mod comment;
pub mod page;
pub mod post;
pub mod user;
pub mod vote;

pub use comment::Comment;
pub use page::{Page, PageParams, Pagination};
pub use post::{Post, PostSort};
pub use user::{UserProfile, UserRef};
pub use vote::{ViewerVote, VoteDirection, VoteState};
