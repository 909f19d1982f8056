pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{ApiGateway, ApiRequest};
pub use application::services::{
    invalidation_patterns, MutationCoordinator, MutationKind, MutationOutcome, MutationPlan,
    QueryService,
};
pub use domain::entities::{
    Comment, Page, PageParams, Pagination, Post, PostSort, UserProfile, UserRef, ViewerVote,
    VoteDirection, VoteState,
};
pub use domain::value_objects::{
    CacheKey, CachePayload, KeyPattern, MutationId, OptimisticPatch, PayloadKind, ProfileChanges,
};
pub use infrastructure::cache::{CacheEntry, CacheStore};
pub use shared::{AppConfig, AppError, CacheConfig, ContentLimits, Result};

/// Initialize tracing for embedding applications and examples.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "khive=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
