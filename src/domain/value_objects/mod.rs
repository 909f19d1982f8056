#![allow(unused_imports)]

pub mod cache_key;
pub mod mutation_id;
pub mod patch;
pub mod payload;

pub use cache_key::{CacheKey, KeyPattern};
pub use mutation_id::MutationId;
pub use patch::{OptimisticPatch, ProfileChanges};
pub use payload::{CachePayload, PayloadKind};
