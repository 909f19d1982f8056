use crate::domain::entities::{Comment, Page, Post, UserProfile, VoteState};
use crate::shared::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shape a cache entry is expected to hold, derived from its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Post,
    Comment,
    PostPage,
    CommentPage,
    Profile,
    Count,
}

/// Typed union of everything the cache can hold. API responses are
/// decoded into one of these at the boundary; a response that does not
/// match the expected shape is rejected instead of cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CachePayload {
    Post(Post),
    Comment(Comment),
    PostPage(Page<Post>),
    CommentPage(Page<Comment>),
    Profile(UserProfile),
    Count(u64),
}

impl CachePayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            CachePayload::Post(_) => PayloadKind::Post,
            CachePayload::Comment(_) => PayloadKind::Comment,
            CachePayload::PostPage(_) => PayloadKind::PostPage,
            CachePayload::CommentPage(_) => PayloadKind::CommentPage,
            CachePayload::Profile(_) => PayloadKind::Profile,
            CachePayload::Count(_) => PayloadKind::Count,
        }
    }

    /// Fail-fast decode of a server response into the expected shape.
    pub fn decode(kind: PayloadKind, value: Value) -> Result<Self, AppError> {
        fn parse<T: DeserializeOwned>(value: Value, shape: &str) -> Result<T, AppError> {
            serde_json::from_value(value).map_err(|e| {
                AppError::Deserialization(format!("response does not match {shape}: {e}"))
            })
        }

        Ok(match kind {
            PayloadKind::Post => CachePayload::Post(parse(value, "post")?),
            PayloadKind::Comment => CachePayload::Comment(parse(value, "comment")?),
            PayloadKind::PostPage => CachePayload::PostPage(parse(value, "post page")?),
            PayloadKind::CommentPage => CachePayload::CommentPage(parse(value, "comment page")?),
            PayloadKind::Profile => CachePayload::Profile(parse(value, "profile")?),
            PayloadKind::Count => CachePayload::Count(parse(value, "count")?),
        })
    }

    pub fn as_post(&self) -> Option<&Post> {
        match self {
            CachePayload::Post(post) => Some(post),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            CachePayload::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_profile(&self) -> Option<&UserProfile> {
        match self {
            CachePayload::Profile(profile) => Some(profile),
            _ => None,
        }
    }

    /// Vote state of the underlying entity, when it has one.
    pub fn vote_state(&self) -> Option<VoteState> {
        match self {
            CachePayload::Post(post) => Some(post.votes),
            CachePayload::Comment(comment) => Some(comment.votes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_post_round() {
        let value = json!({
            "id": "p1",
            "title": "Hello hive",
            "content": "first",
            "author": {"id": "u1", "username": "kay"},
            "upvotes": 3,
            "downvotes": 0,
            "viewerVote": "none",
            "commentCount": 2,
            "createdAt": "2026-01-05T10:00:00Z"
        });
        let payload = CachePayload::decode(PayloadKind::Post, value).unwrap();
        let post = payload.as_post().unwrap();
        assert_eq!(post.votes.upvotes, 3);
        assert_eq!(post.comment_count, 2);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        let value = json!({"unexpected": true});
        let err = CachePayload::decode(PayloadKind::Comment, value).unwrap_err();
        assert!(err.to_string().contains("comment"));
    }

    #[test]
    fn test_decode_comment_page() {
        let value = json!({
            "data": [{
                "id": "c1",
                "postId": "p1",
                "content": "nice",
                "author": {"id": "u2", "username": "bee"},
                "upvotes": 1,
                "downvotes": 0,
                "createdAt": "2026-01-05T11:00:00Z"
            }],
            "pagination": {"page": 1, "totalPages": 1, "total": 1}
        });
        let payload = CachePayload::decode(PayloadKind::CommentPage, value).unwrap();
        match payload {
            CachePayload::CommentPage(page) => {
                assert_eq!(page.data.len(), 1);
                assert_eq!(page.pagination.total, 1);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
