use crate::domain::entities::{PageParams, PostSort, VoteDirection};
use crate::domain::value_objects::ProfileChanges;
use async_trait::async_trait;
use serde_json::Value;

/// REST call shapes the core emits. Transport, auth and retries live behind
/// the gateway; this layer only names the verb, the path and the body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    ListPosts { sort: PostSort, params: PageParams },
    GetPost { post_id: String },
    CreatePost { title: String, content: String },
    UpdatePost { post_id: String, title: String, content: String },
    DeletePost { post_id: String },
    VotePost { post_id: String, direction: VoteDirection },
    GetComments { post_id: String, params: PageParams },
    GetReplies { comment_id: String, params: PageParams },
    GetUserPosts { user_id: String, params: PageParams },
    GetUserComments { user_id: String, params: PageParams },
    CreateComment {
        post_id: String,
        parent_comment_id: Option<String>,
        content: String,
    },
    UpdateComment { comment_id: String, content: String },
    DeleteComment { comment_id: String },
    VoteComment { comment_id: String, direction: VoteDirection },
    GetProfile,
    UpdateProfile { changes: ProfileChanges },
    SubmitFeedback { message: String },
}

impl ApiRequest {
    pub fn method(&self) -> &'static str {
        match self {
            ApiRequest::ListPosts { .. }
            | ApiRequest::GetPost { .. }
            | ApiRequest::GetComments { .. }
            | ApiRequest::GetReplies { .. }
            | ApiRequest::GetUserPosts { .. }
            | ApiRequest::GetUserComments { .. }
            | ApiRequest::GetProfile => "GET",
            ApiRequest::CreatePost { .. }
            | ApiRequest::CreateComment { .. }
            | ApiRequest::VotePost { .. }
            | ApiRequest::VoteComment { .. }
            | ApiRequest::SubmitFeedback { .. } => "POST",
            ApiRequest::UpdatePost { .. } | ApiRequest::UpdateComment { .. } => "PUT",
            ApiRequest::UpdateProfile { .. } => "PATCH",
            ApiRequest::DeletePost { .. } | ApiRequest::DeleteComment { .. } => "DELETE",
        }
    }

    pub fn path(&self) -> String {
        match self {
            ApiRequest::ListPosts { sort, params } => format!(
                "/api/posts?sort={}&page={}&limit={}",
                sort.as_str(),
                params.page,
                params.limit
            ),
            ApiRequest::GetPost { post_id } => format!("/api/posts/{post_id}"),
            ApiRequest::CreatePost { .. } => "/api/posts".to_string(),
            ApiRequest::UpdatePost { post_id, .. } => format!("/api/posts/{post_id}"),
            ApiRequest::DeletePost { post_id } => format!("/api/posts/{post_id}"),
            ApiRequest::VotePost { post_id, direction } => {
                format!("/api/posts/{post_id}/{}", direction.as_endpoint())
            }
            ApiRequest::GetComments { post_id, params } => format!(
                "/api/comments/post/{post_id}?page={}&limit={}",
                params.page, params.limit
            ),
            ApiRequest::GetReplies { comment_id, params } => format!(
                "/api/comments/{comment_id}/replies?page={}&limit={}",
                params.page, params.limit
            ),
            ApiRequest::GetUserPosts { user_id, params } => format!(
                "/api/posts/user/{user_id}?page={}&limit={}",
                params.page, params.limit
            ),
            ApiRequest::GetUserComments { user_id, params } => format!(
                "/api/comments/user/{user_id}?page={}&limit={}",
                params.page, params.limit
            ),
            ApiRequest::CreateComment { .. } => "/api/comments".to_string(),
            ApiRequest::UpdateComment { comment_id, .. } => format!("/api/comments/{comment_id}"),
            ApiRequest::DeleteComment { comment_id } => format!("/api/comments/{comment_id}"),
            ApiRequest::VoteComment {
                comment_id,
                direction,
            } => format!("/api/comments/{comment_id}/{}", direction.as_endpoint()),
            ApiRequest::GetProfile | ApiRequest::UpdateProfile { .. } => {
                "/api/users/self".to_string()
            }
            ApiRequest::SubmitFeedback { .. } => "/api/feedback".to_string(),
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            ApiRequest::CreatePost { title, content } => Some(serde_json::json!({
                "title": title,
                "content": content,
            })),
            ApiRequest::UpdatePost { title, content, .. } => Some(serde_json::json!({
                "title": title,
                "content": content,
            })),
            ApiRequest::CreateComment {
                post_id,
                parent_comment_id,
                content,
            } => Some(serde_json::json!({
                "postId": post_id,
                "parentCommentId": parent_comment_id,
                "content": content,
            })),
            ApiRequest::UpdateComment { content, .. } => {
                Some(serde_json::json!({ "content": content }))
            }
            ApiRequest::UpdateProfile { changes } => serde_json::to_value(changes).ok(),
            ApiRequest::SubmitFeedback { message } => {
                Some(serde_json::json!({ "message": message }))
            }
            _ => None,
        }
    }
}

/// Opaque asynchronous network boundary. The single suspension point of a
/// mutation; everything before and after it is synchronous cache work.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn send(&self, request: ApiRequest) -> anyhow::Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_request_maps_to_direction_endpoint() {
        let request = ApiRequest::VotePost {
            post_id: "42".to_string(),
            direction: VoteDirection::Down,
        };
        assert_eq!(request.method(), "POST");
        assert_eq!(request.path(), "/api/posts/42/downvote");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_create_comment_body_carries_parent() {
        let request = ApiRequest::CreateComment {
            post_id: "42".to_string(),
            parent_comment_id: Some("c7".to_string()),
            content: "hello".to_string(),
        };
        let body = request.body().unwrap();
        assert_eq!(body["postId"], "42");
        assert_eq!(body["parentCommentId"], "c7");
    }

    #[test]
    fn test_list_requests_carry_pagination() {
        let request = ApiRequest::GetComments {
            post_id: "42".to_string(),
            params: PageParams::new(3, 20),
        };
        assert_eq!(request.path(), "/api/comments/post/42?page=3&limit=20");
    }
}
