use crate::domain::value_objects::{CacheKey, KeyPattern};

/// What a mutation did, plus the context needed to resolve which cached
/// views it can have affected.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationKind {
    VotePost {
        post_id: String,
    },
    VoteComment {
        comment_id: String,
        post_id: String,
    },
    CreatePost,
    UpdatePost {
        post_id: String,
    },
    DeletePost {
        post_id: String,
    },
    CreateComment {
        post_id: String,
        parent_comment_id: Option<String>,
    },
    UpdateComment {
        comment_id: String,
    },
    DeleteComment {
        comment_id: String,
        post_id: String,
        parent_comment_id: Option<String>,
    },
    UpdateProfile {
        user_id: String,
    },
    SubmitFeedback,
}

/// Static invalidation table: every cached view that may be out of date
/// once a mutation of this kind commits. Patterns are handed to
/// `CacheStore::mark_stale`, which never blocks and never fails.
pub fn invalidation_patterns(kind: &MutationKind) -> Vec<KeyPattern> {
    match kind {
        // Vote counts are local to the entity; no fan-out.
        MutationKind::VotePost { post_id } => {
            vec![KeyPattern::exact(CacheKey::post(post_id))]
        }
        MutationKind::VoteComment {
            comment_id,
            post_id,
        } => vec![
            KeyPattern::exact(CacheKey::comment(comment_id)),
            KeyPattern::prefix(&format!("comments:post:{post_id}:")),
            KeyPattern::prefix("replies:comment:"),
            KeyPattern::prefix("comments:user:"),
        ],
        MutationKind::CreatePost => vec![KeyPattern::prefix("posts:")],
        MutationKind::UpdatePost { post_id } => vec![
            KeyPattern::prefix("posts:"),
            KeyPattern::exact(CacheKey::post(post_id)),
        ],
        MutationKind::DeletePost { post_id } => vec![
            KeyPattern::prefix("posts:"),
            KeyPattern::exact(CacheKey::post(post_id)),
        ],
        MutationKind::CreateComment {
            post_id,
            parent_comment_id,
        } => comment_tree_patterns(post_id, parent_comment_id.as_deref(), None),
        MutationKind::UpdateComment { comment_id } => vec![
            KeyPattern::exact(CacheKey::comment(comment_id)),
            KeyPattern::prefix("comments:post:"),
            KeyPattern::prefix("comments:user:"),
            KeyPattern::prefix("replies:comment:"),
        ],
        // Deleting fans out over the same views as creating, plus the
        // comment itself.
        MutationKind::DeleteComment {
            comment_id,
            post_id,
            parent_comment_id,
        } => comment_tree_patterns(post_id, parent_comment_id.as_deref(), Some(comment_id)),
        MutationKind::UpdateProfile { user_id } => vec![
            KeyPattern::exact(CacheKey::user_self()),
            KeyPattern::exact(CacheKey::user(user_id)),
            KeyPattern::prefix(&format!("posts:user:{user_id}:")),
            KeyPattern::prefix(&format!("comments:user:{user_id}:")),
        ],
        // Feedback lands in a support inbox, not in any cached view.
        MutationKind::SubmitFeedback => Vec::new(),
    }
}

fn comment_tree_patterns(
    post_id: &str,
    parent_comment_id: Option<&str>,
    comment_id: Option<&str>,
) -> Vec<KeyPattern> {
    let mut patterns = vec![
        KeyPattern::prefix(&format!("comments:post:{post_id}:")),
        KeyPattern::exact(CacheKey::comment_count(post_id)),
        KeyPattern::exact(CacheKey::post(post_id)),
        KeyPattern::prefix("comments:user:"),
    ];
    if let Some(comment_id) = comment_id {
        patterns.push(KeyPattern::exact(CacheKey::comment(comment_id)));
    }
    if let Some(parent) = parent_comment_id {
        patterns.push(KeyPattern::prefix(&format!("replies:comment:{parent}:")));
        patterns.push(KeyPattern::exact(CacheKey::reply_count(parent)));
    }
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(patterns: &[KeyPattern], raw: &str) -> bool {
        patterns.iter().any(|p| p.as_str() == raw)
    }

    #[test]
    fn test_vote_post_has_no_fanout() {
        let patterns = invalidation_patterns(&MutationKind::VotePost {
            post_id: "42".to_string(),
        });
        assert_eq!(patterns.len(), 1);
        assert!(contains(&patterns, "post:42"));
    }

    #[test]
    fn test_create_top_level_comment_patterns() {
        let patterns = invalidation_patterns(&MutationKind::CreateComment {
            post_id: "42".to_string(),
            parent_comment_id: None,
        });
        assert!(contains(&patterns, "comments:post:42:*"));
        assert!(contains(&patterns, "post:42"));
        assert!(!patterns.iter().any(|p| p.as_str().starts_with("repliesCount:")));
    }

    #[test]
    fn test_create_reply_also_invalidates_parent_views() {
        let patterns = invalidation_patterns(&MutationKind::CreateComment {
            post_id: "42".to_string(),
            parent_comment_id: Some("c7".to_string()),
        });
        assert!(contains(&patterns, "comments:post:42:*"));
        assert!(contains(&patterns, "post:42"));
        assert!(contains(&patterns, "repliesCount:comment:c7"));
        assert!(contains(&patterns, "replies:comment:c7:*"));
    }

    #[test]
    fn test_delete_comment_matches_create_set() {
        let create = invalidation_patterns(&MutationKind::CreateComment {
            post_id: "42".to_string(),
            parent_comment_id: Some("c7".to_string()),
        });
        let delete = invalidation_patterns(&MutationKind::DeleteComment {
            comment_id: "c9".to_string(),
            post_id: "42".to_string(),
            parent_comment_id: Some("c7".to_string()),
        });
        for pattern in &create {
            assert!(delete.contains(pattern), "missing {pattern}");
        }
        assert!(contains(&delete, "comment:c9"));
    }

    #[test]
    fn test_feedback_touches_no_cached_view() {
        assert!(invalidation_patterns(&MutationKind::SubmitFeedback).is_empty());
    }

    #[test]
    fn test_profile_update_invalidates_denormalized_views() {
        let patterns = invalidation_patterns(&MutationKind::UpdateProfile {
            user_id: "u1".to_string(),
        });
        assert!(contains(&patterns, "user:self"));
        assert!(contains(&patterns, "posts:user:u1:*"));
        assert!(contains(&patterns, "comments:user:u1:*"));
    }
}
