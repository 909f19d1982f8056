#![allow(unused_imports)]

pub mod entities;
pub mod value_objects;

pub use entities::{Comment, Page, PageParams, Post, UserProfile, VoteState};
pub use value_objects::{CacheKey, CachePayload, KeyPattern, MutationId, OptimisticPatch};
