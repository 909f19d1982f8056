use super::payload::CachePayload;
use crate::domain::entities::VoteDirection;
use serde::{Deserialize, Serialize};

/// Profile fields a viewer can change; `None` leaves the field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none() && self.avatar_url.is_none()
    }
}

/// Predicted result of a mutation, expressed as data so the transition
/// stays a pure function of the current payload. Applying a patch to a
/// payload of the wrong shape yields `None` and the entry is left alone.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimisticPatch {
    Vote(VoteDirection),
    EditComment { content: String },
    TombstoneComment,
    Profile(ProfileChanges),
}

impl OptimisticPatch {
    pub fn apply(&self, current: &CachePayload) -> Option<CachePayload> {
        match (self, current) {
            (OptimisticPatch::Vote(direction), CachePayload::Post(post)) => {
                let mut next = post.clone();
                next.votes = next.votes.apply(*direction);
                Some(CachePayload::Post(next))
            }
            (OptimisticPatch::Vote(direction), CachePayload::Comment(comment)) => {
                let mut next = comment.clone();
                next.votes = next.votes.apply(*direction);
                Some(CachePayload::Comment(next))
            }
            (OptimisticPatch::EditComment { content }, CachePayload::Comment(comment)) => {
                let mut next = comment.clone();
                next.content = content.clone();
                next.is_edited = true;
                Some(CachePayload::Comment(next))
            }
            (OptimisticPatch::TombstoneComment, CachePayload::Comment(comment)) => {
                let mut next = comment.clone();
                next.is_deleted = true;
                Some(CachePayload::Comment(next))
            }
            (OptimisticPatch::Profile(changes), CachePayload::Profile(profile)) => {
                let mut next = profile.clone();
                if let Some(display_name) = &changes.display_name {
                    next.display_name = Some(display_name.clone());
                }
                if let Some(bio) = &changes.bio {
                    next.bio = Some(bio.clone());
                }
                if let Some(avatar_url) = &changes.avatar_url {
                    next.avatar_url = Some(avatar_url.clone());
                }
                Some(CachePayload::Profile(next))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Comment, UserRef, ViewerVote, VoteState};
    use chrono::Utc;

    fn comment() -> Comment {
        Comment {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            parent_comment_id: None,
            content: "original".to_string(),
            author: UserRef {
                id: "u1".to_string(),
                username: "kay".to_string(),
                display_name: None,
                avatar_url: None,
            },
            votes: VoteState::new(2, 0, ViewerVote::None),
            reply_count: 0,
            is_edited: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_vote_patch_updates_counts_and_viewer_together() {
        let payload = CachePayload::Comment(comment());
        let patched = OptimisticPatch::Vote(VoteDirection::Up)
            .apply(&payload)
            .unwrap();
        let votes = patched.vote_state().unwrap();
        assert_eq!(votes.upvotes, 3);
        assert_eq!(votes.viewer_vote, ViewerVote::Up);
    }

    #[test]
    fn test_edit_patch_flags_edited() {
        let payload = CachePayload::Comment(comment());
        let patched = OptimisticPatch::EditComment {
            content: "better".to_string(),
        }
        .apply(&payload)
        .unwrap();
        let comment = patched.as_comment().unwrap();
        assert_eq!(comment.content, "better");
        assert!(comment.is_edited);
    }

    #[test]
    fn test_patch_on_wrong_shape_is_none() {
        let payload = CachePayload::Count(7);
        assert!(OptimisticPatch::TombstoneComment.apply(&payload).is_none());
    }
}
