use crate::application::ports::{ApiGateway, ApiRequest};
use crate::domain::entities::{Comment, Page, PageParams, Post, PostSort, UserProfile};
use crate::domain::value_objects::{CacheKey, CachePayload, PayloadKind};
use crate::infrastructure::cache::CacheStore;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read path over the cache store. Fresh entries are served directly;
/// stale entries are served while a background refetch revalidates them
/// (stale-while-revalidate); misses fetch, decode fail-fast and cache.
pub struct QueryService {
    store: Arc<CacheStore>,
    gateway: Arc<dyn ApiGateway>,
}

impl QueryService {
    pub fn new(store: Arc<CacheStore>, gateway: Arc<dyn ApiGateway>) -> Self {
        Self { store, gateway }
    }

    pub async fn post(&self, post_id: &str) -> Result<Post, AppError> {
        let payload = self
            .fetch(
                CacheKey::post(post_id),
                PayloadKind::Post,
                ApiRequest::GetPost {
                    post_id: post_id.to_string(),
                },
            )
            .await?;
        match payload {
            CachePayload::Post(post) => Ok(post),
            other => Err(unexpected_shape("post", &other)),
        }
    }

    pub async fn posts(&self, sort: PostSort, params: PageParams) -> Result<Page<Post>, AppError> {
        let payload = self
            .fetch(
                CacheKey::posts_page(sort, params.page),
                PayloadKind::PostPage,
                ApiRequest::ListPosts { sort, params },
            )
            .await?;
        match payload {
            CachePayload::PostPage(page) => Ok(page),
            other => Err(unexpected_shape("post page", &other)),
        }
    }

    pub async fn comments(
        &self,
        post_id: &str,
        params: PageParams,
    ) -> Result<Page<Comment>, AppError> {
        let payload = self
            .fetch(
                CacheKey::comments_for_post(post_id, params.page),
                PayloadKind::CommentPage,
                ApiRequest::GetComments {
                    post_id: post_id.to_string(),
                    params,
                },
            )
            .await?;
        match payload {
            CachePayload::CommentPage(page) => Ok(page),
            other => Err(unexpected_shape("comment page", &other)),
        }
    }

    pub async fn user_posts(
        &self,
        user_id: &str,
        params: PageParams,
    ) -> Result<Page<Post>, AppError> {
        let payload = self
            .fetch(
                CacheKey::posts_by_user(user_id, params.page),
                PayloadKind::PostPage,
                ApiRequest::GetUserPosts {
                    user_id: user_id.to_string(),
                    params,
                },
            )
            .await?;
        match payload {
            CachePayload::PostPage(page) => Ok(page),
            other => Err(unexpected_shape("post page", &other)),
        }
    }

    pub async fn user_comments(
        &self,
        user_id: &str,
        params: PageParams,
    ) -> Result<Page<Comment>, AppError> {
        let payload = self
            .fetch(
                CacheKey::comments_by_user(user_id, params.page),
                PayloadKind::CommentPage,
                ApiRequest::GetUserComments {
                    user_id: user_id.to_string(),
                    params,
                },
            )
            .await?;
        match payload {
            CachePayload::CommentPage(page) => Ok(page),
            other => Err(unexpected_shape("comment page", &other)),
        }
    }

    pub async fn replies(
        &self,
        comment_id: &str,
        params: PageParams,
    ) -> Result<Page<Comment>, AppError> {
        let payload = self
            .fetch(
                CacheKey::replies(comment_id, params.page),
                PayloadKind::CommentPage,
                ApiRequest::GetReplies {
                    comment_id: comment_id.to_string(),
                    params,
                },
            )
            .await?;
        match payload {
            CachePayload::CommentPage(page) => Ok(page),
            other => Err(unexpected_shape("reply page", &other)),
        }
    }

    pub async fn profile(&self) -> Result<UserProfile, AppError> {
        let payload = self
            .fetch(CacheKey::user_self(), PayloadKind::Profile, ApiRequest::GetProfile)
            .await?;
        match payload {
            CachePayload::Profile(profile) => Ok(profile),
            other => Err(unexpected_shape("profile", &other)),
        }
    }

    async fn fetch(
        &self,
        key: CacheKey,
        kind: PayloadKind,
        request: ApiRequest,
    ) -> Result<CachePayload, AppError> {
        if let Some(entry) = self.store.get(&key).await {
            if !self.store.needs_revalidation(&entry) {
                return Ok(entry.payload);
            }
            debug!("Serving stale entry for {} while revalidating", key);
            self.revalidate_in_background(key, kind, request);
            return Ok(entry.payload);
        }

        let value = self
            .gateway
            .send(request)
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        let payload = CachePayload::decode(kind, value)?;
        self.store.set_confirmed(key, payload.clone()).await;
        Ok(payload)
    }

    fn revalidate_in_background(&self, key: CacheKey, kind: PayloadKind, request: ApiRequest) {
        let store = Arc::clone(&self.store);
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            match gateway.send(request).await {
                Ok(value) => match CachePayload::decode(kind, value) {
                    Ok(payload) => store.set_confirmed(key, payload).await,
                    Err(err) => warn!("Revalidation of {} returned bad shape: {}", key, err),
                },
                Err(err) => warn!("Revalidation of {} failed: {}", key, err),
            }
        });
    }
}

fn unexpected_shape(expected: &str, got: &CachePayload) -> AppError {
    AppError::Cache(format!(
        "cached entry is not a {expected} (found {:?})",
        got.kind()
    ))
}
