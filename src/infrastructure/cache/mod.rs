pub mod store;

pub use store::{CacheEntry, CacheStore, Snapshot};
