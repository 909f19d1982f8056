pub mod invalidation;
pub mod mutation_service;
pub mod query_service;

pub use invalidation::{invalidation_patterns, MutationKind};
pub use mutation_service::{MutationCoordinator, MutationOutcome, MutationPlan, MutationStatus};
pub use query_service::QueryService;
