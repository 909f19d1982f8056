use crate::domain::value_objects::{CacheKey, CachePayload, KeyPattern, MutationId, OptimisticPatch};
use crate::shared::config::CacheConfig;
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Last known state of one cached view plus its freshness metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: CachePayload,
    pub fetched_at: DateTime<Utc>,
    pub stale_since: Option<DateTime<Utc>>,
    pub in_flight_mutation: Option<MutationId>,
}

impl CacheEntry {
    fn confirmed(payload: CachePayload) -> Self {
        Self {
            payload,
            fetched_at: Utc::now(),
            stale_since: None,
            in_flight_mutation: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.stale_since.is_some()
    }
}

/// Pre-mutation state of the targeted keys, owned by the mutation until
/// settlement. `None` means the key was absent when the snapshot was taken.
pub type Snapshot = Vec<(CacheKey, Option<CacheEntry>)>;

/// Single source of truth for last-known entity state, addressable by key.
/// All mutating operations run to completion under one write guard, so a
/// reader sees either none or all of a mutation's optimistic batch.
pub struct CacheStore {
    entries: RwLock<LruCache<CacheKey, CacheEntry>>,
    fresh_ttl: Duration,
}

impl CacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            fresh_ttl: Duration::seconds(config.fresh_ttl as i64),
        }
    }

    /// Read one entry. Stale entries are still returned so readers can
    /// serve them while a refetch is pending.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut entries = self.entries.write().await;
        entries.get(key).cloned()
    }

    /// Insert or replace an entry with server-confirmed data. Clears any
    /// stale marker and pending-mutation bookkeeping for the key.
    pub async fn set_confirmed(&self, key: CacheKey, payload: CachePayload) {
        let mut entries = self.entries.write().await;
        entries.put(key, CacheEntry::confirmed(payload));
    }

    /// Apply a pure transformation to the current value. A missing key or a
    /// payload the patch does not understand is a no-op, not an error.
    pub async fn patch(&self, key: &CacheKey, patch: &OptimisticPatch) -> bool {
        let mut entries = self.entries.write().await;
        Self::patch_locked(&mut entries, key, patch, None)
    }

    pub async fn remove(&self, key: &CacheKey) -> Option<CacheEntry> {
        let mut entries = self.entries.write().await;
        entries.pop(key)
    }

    /// Set the stale marker on every entry matching the pattern. Keeps the
    /// data in place; the next read decides whether to refetch.
    pub async fn mark_stale(&self, pattern: &KeyPattern) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if pattern.matches(key) && entry.stale_since.is_none() {
                entry.stale_since = Some(now);
                marked += 1;
            }
        }
        debug!("Marked {} entries stale for pattern {}", marked, pattern);
        marked
    }

    /// Snapshot every target key and apply the optimistic patch to all of
    /// them under one write guard. Readers never observe a torn batch.
    pub async fn apply_optimistic(
        &self,
        mutation_id: MutationId,
        target_keys: &[CacheKey],
        patch: &OptimisticPatch,
    ) -> Snapshot {
        let mut entries = self.entries.write().await;
        let mut snapshot = Snapshot::with_capacity(target_keys.len());
        for key in target_keys {
            snapshot.push((key.clone(), entries.peek(key).cloned()));
            Self::patch_locked(&mut entries, key, patch, Some(mutation_id));
        }
        snapshot
    }

    /// Settle a successful mutation: store the server-confirmed payloads
    /// and release the pending-mutation marker on every snapshotted key.
    pub async fn commit(
        &self,
        mutation_id: MutationId,
        snapshot: &Snapshot,
        confirmed: Vec<(CacheKey, CachePayload)>,
    ) {
        let mut entries = self.entries.write().await;
        for (key, _) in snapshot {
            if let Some(entry) = entries.peek_mut(key) {
                if entry.in_flight_mutation == Some(mutation_id) {
                    entry.in_flight_mutation = None;
                }
            }
        }
        for (key, payload) in confirmed {
            entries.put(key, CacheEntry::confirmed(payload));
        }
    }

    /// Settle a failed mutation: restore every snapshotted key to its
    /// pre-mutation value. Keys that were absent at snapshot time are left
    /// alone; the optimistic patch never landed on them, and a concurrent
    /// confirmed read may have filled them since.
    pub async fn rollback(&self, mutation_id: MutationId, snapshot: &Snapshot) {
        let mut entries = self.entries.write().await;
        for (key, previous) in snapshot {
            match previous {
                Some(entry) => {
                    let mut restored = entry.clone();
                    restored.in_flight_mutation = None;
                    entries.put(key.clone(), restored);
                }
                None => {
                    if let Some(entry) = entries.peek_mut(key) {
                        if entry.in_flight_mutation == Some(mutation_id) {
                            entry.in_flight_mutation = None;
                        }
                    }
                }
            }
        }
        debug!("Rolled back {} keys for mutation {}", snapshot.len(), mutation_id);
    }

    /// Whether a refetch should be triggered for this entry.
    pub fn needs_revalidation(&self, entry: &CacheEntry) -> bool {
        entry.is_stale() || Utc::now() - entry.fetched_at >= self.fresh_ttl
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn patch_locked(
        entries: &mut LruCache<CacheKey, CacheEntry>,
        key: &CacheKey,
        patch: &OptimisticPatch,
        mutation_id: Option<MutationId>,
    ) -> bool {
        let Some(entry) = entries.peek_mut(key) else {
            debug!("Patch skipped, key absent: {}", key);
            return false;
        };
        match patch.apply(&entry.payload) {
            Some(next) => {
                entry.payload = next;
                if mutation_id.is_some() {
                    entry.in_flight_mutation = mutation_id;
                }
                true
            }
            None => {
                warn!("Patch does not fit payload shape for key {}", key);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Post, UserRef, ViewerVote, VoteDirection, VoteState};

    fn post(id: &str, up: u32, down: u32) -> CachePayload {
        CachePayload::Post(Post {
            id: id.to_string(),
            title: "title".to_string(),
            content: "content".to_string(),
            author: UserRef {
                id: "u1".to_string(),
                username: "kay".to_string(),
                display_name: None,
                avatar_url: None,
            },
            votes: VoteState::new(up, down, ViewerVote::None),
            comment_count: 0,
            image_url: None,
            is_edited: false,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    fn store() -> CacheStore {
        CacheStore::new(&CacheConfig::default())
    }

    #[tokio::test]
    async fn test_set_then_get_returns_fresh_entry() {
        let store = store();
        let key = CacheKey::post("1");
        store.set_confirmed(key.clone(), post("1", 5, 1)).await;

        let entry = store.get(&key).await.unwrap();
        assert!(!entry.is_stale());
        assert!(entry.in_flight_mutation.is_none());
        assert_eq!(entry.payload.vote_state().unwrap().upvotes, 5);
    }

    #[tokio::test]
    async fn test_patch_absent_key_is_noop() {
        let store = store();
        let key = CacheKey::post("missing");
        let landed = store
            .patch(&key, &OptimisticPatch::Vote(VoteDirection::Up))
            .await;
        assert!(!landed);
        assert!(store.get(&key).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_mark_stale_matches_pattern_without_deleting() {
        let store = store();
        store
            .set_confirmed(CacheKey::comments_for_post("42", 1), post("x", 0, 0))
            .await;
        store
            .set_confirmed(CacheKey::comments_for_post("42", 2), post("y", 0, 0))
            .await;
        store
            .set_confirmed(CacheKey::comments_for_post("43", 1), post("z", 0, 0))
            .await;

        let marked = store
            .mark_stale(&KeyPattern::prefix("comments:post:42:"))
            .await;
        assert_eq!(marked, 2);
        assert_eq!(store.len().await, 3);

        let entry = store
            .get(&CacheKey::comments_for_post("42", 1))
            .await
            .unwrap();
        assert!(entry.is_stale());
        let untouched = store
            .get(&CacheKey::comments_for_post("43", 1))
            .await
            .unwrap();
        assert!(!untouched.is_stale());
    }

    #[tokio::test]
    async fn test_apply_optimistic_snapshots_before_patching() {
        let store = store();
        let key = CacheKey::post("1");
        store.set_confirmed(key.clone(), post("1", 5, 1)).await;

        let mutation_id = MutationId::generate();
        let snapshot = store
            .apply_optimistic(
                mutation_id,
                &[key.clone()],
                &OptimisticPatch::Vote(VoteDirection::Up),
            )
            .await;

        let (_, before) = &snapshot[0];
        assert_eq!(
            before.as_ref().unwrap().payload.vote_state().unwrap().upvotes,
            5
        );

        let entry = store.get(&key).await.unwrap();
        assert_eq!(entry.payload.vote_state().unwrap().upvotes, 6);
        assert_eq!(entry.in_flight_mutation, Some(mutation_id));
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot_exactly() {
        let store = store();
        let key = CacheKey::post("1");
        store.set_confirmed(key.clone(), post("1", 5, 1)).await;
        let before = store.get(&key).await.unwrap();

        let mutation_id = MutationId::generate();
        let snapshot = store
            .apply_optimistic(
                mutation_id,
                &[key.clone()],
                &OptimisticPatch::Vote(VoteDirection::Up),
            )
            .await;
        store.rollback(mutation_id, &snapshot).await;

        let after = store.get(&key).await.unwrap();
        assert_eq!(after.payload, before.payload);
        assert_eq!(after.fetched_at, before.fetched_at);
        assert!(after.in_flight_mutation.is_none());
    }

    #[tokio::test]
    async fn test_rollback_skips_keys_absent_at_snapshot() {
        let store = store();
        let key = CacheKey::post("late");

        let mutation_id = MutationId::generate();
        let snapshot = store
            .apply_optimistic(
                mutation_id,
                &[key.clone()],
                &OptimisticPatch::Vote(VoteDirection::Up),
            )
            .await;

        // A confirmed read lands while the mutation is in flight.
        store.set_confirmed(key.clone(), post("late", 9, 0)).await;
        store.rollback(mutation_id, &snapshot).await;

        let entry = store.get(&key).await.unwrap();
        assert_eq!(entry.payload.vote_state().unwrap().upvotes, 9);
    }

    #[tokio::test]
    async fn test_commit_clears_in_flight_and_stores_confirmed() {
        let store = store();
        let key = CacheKey::post("1");
        store.set_confirmed(key.clone(), post("1", 5, 1)).await;

        let mutation_id = MutationId::generate();
        let snapshot = store
            .apply_optimistic(
                mutation_id,
                &[key.clone()],
                &OptimisticPatch::Vote(VoteDirection::Up),
            )
            .await;
        store
            .commit(mutation_id, &snapshot, vec![(key.clone(), post("1", 6, 1))])
            .await;

        let entry = store.get(&key).await.unwrap();
        assert!(entry.in_flight_mutation.is_none());
        assert!(!entry.is_stale());
        assert_eq!(entry.payload.vote_state().unwrap().upvotes, 6);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let store = CacheStore::new(&config);
        store.set_confirmed(CacheKey::post("a"), post("a", 0, 0)).await;
        store.set_confirmed(CacheKey::post("b"), post("b", 0, 0)).await;
        // Touch "a" so "b" becomes the eviction candidate.
        store.get(&CacheKey::post("a")).await.unwrap();
        store.set_confirmed(CacheKey::post("c"), post("c", 0, 0)).await;

        assert!(store.get(&CacheKey::post("a")).await.is_some());
        assert!(store.get(&CacheKey::post("b")).await.is_none());
        assert_eq!(store.len().await, 2);
    }
}
