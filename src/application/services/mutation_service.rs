use crate::application::ports::{ApiGateway, ApiRequest};
use crate::application::services::invalidation::{invalidation_patterns, MutationKind};
use crate::domain::entities::{Comment, Post, UserProfile, ViewerVote, VoteDirection, VoteState};
use crate::domain::value_objects::{
    CacheKey, CachePayload, MutationId, OptimisticPatch, ProfileChanges,
};
use crate::infrastructure::cache::{CacheStore, Snapshot};
use crate::shared::config::ContentLimits;
use crate::shared::error::AppError;
use crate::shared::validation::{
    validate_bio, validate_comment_body, validate_feedback, validate_post_draft,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One user-initiated mutation, fully described before any cache work
/// happens. Construction runs the precondition checks; an invalid draft
/// never becomes a mutation.
#[derive(Debug, Clone)]
pub struct MutationPlan {
    pub kind: MutationKind,
    pub target_keys: Vec<CacheKey>,
    pub patch: Option<OptimisticPatch>,
    pub request: ApiRequest,
}

impl MutationPlan {
    pub fn vote_post(post_id: &str, direction: VoteDirection) -> Self {
        Self {
            kind: MutationKind::VotePost {
                post_id: post_id.to_string(),
            },
            target_keys: vec![CacheKey::post(post_id)],
            patch: Some(OptimisticPatch::Vote(direction)),
            request: ApiRequest::VotePost {
                post_id: post_id.to_string(),
                direction,
            },
        }
    }

    pub fn vote_comment(comment_id: &str, post_id: &str, direction: VoteDirection) -> Self {
        Self {
            kind: MutationKind::VoteComment {
                comment_id: comment_id.to_string(),
                post_id: post_id.to_string(),
            },
            target_keys: vec![CacheKey::comment(comment_id)],
            patch: Some(OptimisticPatch::Vote(direction)),
            request: ApiRequest::VoteComment {
                comment_id: comment_id.to_string(),
                direction,
            },
        }
    }

    pub fn create_post(
        title: &str,
        content: &str,
        limits: &ContentLimits,
    ) -> Result<Self, AppError> {
        validate_post_draft(title, content, limits)?;
        Ok(Self {
            kind: MutationKind::CreatePost,
            target_keys: Vec::new(),
            patch: None,
            request: ApiRequest::CreatePost {
                title: title.to_string(),
                content: content.to_string(),
            },
        })
    }

    pub fn update_post(
        post_id: &str,
        title: &str,
        content: &str,
        limits: &ContentLimits,
    ) -> Result<Self, AppError> {
        validate_post_draft(title, content, limits)?;
        Ok(Self {
            kind: MutationKind::UpdatePost {
                post_id: post_id.to_string(),
            },
            target_keys: Vec::new(),
            patch: None,
            request: ApiRequest::UpdatePost {
                post_id: post_id.to_string(),
                title: title.to_string(),
                content: content.to_string(),
            },
        })
    }

    pub fn delete_post(post_id: &str) -> Self {
        Self {
            kind: MutationKind::DeletePost {
                post_id: post_id.to_string(),
            },
            target_keys: Vec::new(),
            patch: None,
            request: ApiRequest::DeletePost {
                post_id: post_id.to_string(),
            },
        }
    }

    pub fn create_comment(
        post_id: &str,
        parent_comment_id: Option<&str>,
        content: &str,
        limits: &ContentLimits,
    ) -> Result<Self, AppError> {
        validate_comment_body(content, limits)?;
        Ok(Self {
            kind: MutationKind::CreateComment {
                post_id: post_id.to_string(),
                parent_comment_id: parent_comment_id.map(str::to_string),
            },
            target_keys: Vec::new(),
            patch: None,
            request: ApiRequest::CreateComment {
                post_id: post_id.to_string(),
                parent_comment_id: parent_comment_id.map(str::to_string),
                content: content.to_string(),
            },
        })
    }

    pub fn update_comment(
        comment_id: &str,
        content: &str,
        limits: &ContentLimits,
    ) -> Result<Self, AppError> {
        validate_comment_body(content, limits)?;
        Ok(Self {
            kind: MutationKind::UpdateComment {
                comment_id: comment_id.to_string(),
            },
            target_keys: vec![CacheKey::comment(comment_id)],
            patch: Some(OptimisticPatch::EditComment {
                content: content.to_string(),
            }),
            request: ApiRequest::UpdateComment {
                comment_id: comment_id.to_string(),
                content: content.to_string(),
            },
        })
    }

    pub fn delete_comment(
        comment_id: &str,
        post_id: &str,
        parent_comment_id: Option<&str>,
    ) -> Self {
        Self {
            kind: MutationKind::DeleteComment {
                comment_id: comment_id.to_string(),
                post_id: post_id.to_string(),
                parent_comment_id: parent_comment_id.map(str::to_string),
            },
            target_keys: vec![CacheKey::comment(comment_id)],
            patch: Some(OptimisticPatch::TombstoneComment),
            request: ApiRequest::DeleteComment {
                comment_id: comment_id.to_string(),
            },
        }
    }

    pub fn update_profile(
        user_id: &str,
        changes: ProfileChanges,
        limits: &ContentLimits,
    ) -> Result<Self, AppError> {
        if changes.is_empty() {
            return Err(AppError::Validation(
                "Profile update contains no changes".to_string(),
            ));
        }
        if let Some(bio) = &changes.bio {
            validate_bio(bio, limits)?;
        }
        Ok(Self {
            kind: MutationKind::UpdateProfile {
                user_id: user_id.to_string(),
            },
            target_keys: vec![CacheKey::user_self()],
            patch: Some(OptimisticPatch::Profile(changes.clone())),
            request: ApiRequest::UpdateProfile { changes },
        })
    }

    /// Feedback has no cached representation: no patch, no target keys,
    /// and settlement touches nothing.
    pub fn submit_feedback(message: &str, limits: &ContentLimits) -> Result<Self, AppError> {
        validate_feedback(message, limits)?;
        Ok(Self {
            kind: MutationKind::SubmitFeedback,
            target_keys: Vec::new(),
            patch: None,
            request: ApiRequest::SubmitFeedback {
                message: message.trim().to_string(),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Pending,
    Committed,
    RolledBack,
}

/// Result handed back to the caller once a mutation settles successfully.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub mutation_id: MutationId,
    pub confirmed: Vec<(CacheKey, CachePayload)>,
}

/// Authoritative vote fields of a vote endpoint response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteResponse {
    upvotes: u32,
    downvotes: u32,
    #[serde(alias = "userVote", default)]
    viewer_vote: ViewerVote,
}

/// Drives one mutation end to end: snapshot, optimistic apply, network
/// dispatch, then settle exactly once (commit + invalidation fan-out, or
/// exact rollback). Failures never escape; they come back as `AppError`.
pub struct MutationCoordinator {
    store: Arc<CacheStore>,
    gateway: Arc<dyn ApiGateway>,
}

impl MutationCoordinator {
    pub fn new(store: Arc<CacheStore>, gateway: Arc<dyn ApiGateway>) -> Self {
        Self { store, gateway }
    }

    /// Run a mutation and wait for settlement.
    pub async fn run(&self, plan: MutationPlan) -> Result<MutationOutcome, AppError> {
        let mutation_id = MutationId::generate();
        debug!(
            "Mutation {} started: {} {}",
            mutation_id,
            plan.request.method(),
            plan.request.path()
        );

        // Snapshot and optimistic apply happen as one synchronous batch,
        // before the network call is issued.
        let snapshot: Snapshot = match &plan.patch {
            Some(patch) if !plan.target_keys.is_empty() => {
                self.store
                    .apply_optimistic(mutation_id, &plan.target_keys, patch)
                    .await
            }
            _ => Vec::new(),
        };

        // The single asynchronous suspension point.
        let settled = match self.gateway.send(plan.request.clone()).await {
            Ok(value) => self.reconcile(&plan.kind, value).await,
            Err(err) => Err(AppError::Network(err.to_string())),
        };

        match settled {
            Ok(confirmed) => {
                self.store
                    .commit(mutation_id, &snapshot, confirmed.clone())
                    .await;
                if let MutationKind::DeletePost { post_id } = &plan.kind {
                    self.store.remove(&CacheKey::post(post_id)).await;
                }
                for pattern in invalidation_patterns(&plan.kind) {
                    self.store.mark_stale(&pattern).await;
                }
                debug!("Mutation {} {:?}", mutation_id, MutationStatus::Committed);
                Ok(MutationOutcome {
                    mutation_id,
                    confirmed,
                })
            }
            Err(err) => {
                self.store.rollback(mutation_id, &snapshot).await;
                warn!("Mutation {} {:?}: {}", mutation_id, MutationStatus::RolledBack, err);
                Err(err)
            }
        }
    }

    /// Fire-and-forget variant: settlement runs on a detached task, so it
    /// completes even if the caller drops the handle.
    pub fn spawn(self: &Arc<Self>, plan: MutationPlan) -> JoinHandle<Result<MutationOutcome, AppError>> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run(plan).await })
    }

    /// Turn a success response into the confirmed payloads to store. A
    /// response that does not match the expected shape fails the
    /// settlement, which rolls the optimistic patch back.
    async fn reconcile(
        &self,
        kind: &MutationKind,
        value: serde_json::Value,
    ) -> Result<Vec<(CacheKey, CachePayload)>, AppError> {
        match kind {
            MutationKind::VotePost { post_id } => {
                let vote: VoteResponse = serde_json::from_value(value)
                    .map_err(|e| AppError::Deserialization(format!("vote response: {e}")))?;
                let key = CacheKey::post(post_id);
                Ok(match self.store.get(&key).await {
                    Some(entry) => match entry.payload {
                        CachePayload::Post(mut post) => {
                            post.votes =
                                VoteState::new(vote.upvotes, vote.downvotes, vote.viewer_vote);
                            vec![(key, CachePayload::Post(post))]
                        }
                        _ => Vec::new(),
                    },
                    // Entry evicted mid-flight; invalidation still runs and
                    // the next read refetches.
                    None => Vec::new(),
                })
            }
            MutationKind::VoteComment { comment_id, .. } => {
                let vote: VoteResponse = serde_json::from_value(value)
                    .map_err(|e| AppError::Deserialization(format!("vote response: {e}")))?;
                let key = CacheKey::comment(comment_id);
                Ok(match self.store.get(&key).await {
                    Some(entry) => match entry.payload {
                        CachePayload::Comment(mut comment) => {
                            comment.votes =
                                VoteState::new(vote.upvotes, vote.downvotes, vote.viewer_vote);
                            vec![(key, CachePayload::Comment(comment))]
                        }
                        _ => Vec::new(),
                    },
                    None => Vec::new(),
                })
            }
            MutationKind::CreatePost | MutationKind::UpdatePost { .. } => {
                let post: Post = serde_json::from_value(value)
                    .map_err(|e| AppError::Deserialization(format!("post response: {e}")))?;
                Ok(vec![(CacheKey::post(&post.id), CachePayload::Post(post))])
            }
            MutationKind::DeletePost { .. } => Ok(Vec::new()),
            MutationKind::CreateComment { .. }
            | MutationKind::UpdateComment { .. }
            | MutationKind::DeleteComment { .. } => {
                let comment: Comment = serde_json::from_value(value)
                    .map_err(|e| AppError::Deserialization(format!("comment response: {e}")))?;
                Ok(vec![(
                    CacheKey::comment(&comment.id),
                    CachePayload::Comment(comment),
                )])
            }
            MutationKind::UpdateProfile { user_id } => {
                let profile: UserProfile = serde_json::from_value(value)
                    .map_err(|e| AppError::Deserialization(format!("profile response: {e}")))?;
                Ok(vec![
                    (CacheKey::user_self(), CachePayload::Profile(profile.clone())),
                    (CacheKey::user(user_id), CachePayload::Profile(profile)),
                ])
            }
            // The server only acknowledges; there is nothing to store.
            MutationKind::SubmitFeedback => Ok(Vec::new()),
        }
    }
}
