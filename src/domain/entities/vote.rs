use serde::{Deserialize, Serialize};
use std::fmt;

/// The acting viewer's own vote on an entity, independent of the
/// aggregate counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewerVote {
    #[default]
    None,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Endpoint segment used by the vote API.
    pub fn as_endpoint(&self) -> &'static str {
        match self {
            VoteDirection::Up => "upvote",
            VoteDirection::Down => "downvote",
        }
    }

    fn as_viewer_vote(&self) -> ViewerVote {
        match self {
            VoteDirection::Up => ViewerVote::Up,
            VoteDirection::Down => ViewerVote::Down,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_endpoint())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteState {
    pub upvotes: u32,
    pub downvotes: u32,
    #[serde(default)]
    pub viewer_vote: ViewerVote,
}

impl VoteState {
    pub fn new(upvotes: u32, downvotes: u32, viewer_vote: ViewerVote) -> Self {
        Self {
            upvotes,
            downvotes,
            viewer_vote,
        }
    }

    /// Pure 3-state toggle transition: the same intent twice clears the
    /// viewer vote, the opposite intent moves one count to the other
    /// counter. Counters and viewer vote always change together.
    pub fn apply(&self, intent: VoteDirection) -> VoteState {
        let requested = intent.as_viewer_vote();
        let mut next = *self;

        if self.viewer_vote == requested {
            // Toggle off.
            next.viewer_vote = ViewerVote::None;
            match intent {
                VoteDirection::Up => next.upvotes = next.upvotes.saturating_sub(1),
                VoteDirection::Down => next.downvotes = next.downvotes.saturating_sub(1),
            }
        } else {
            if self.viewer_vote == ViewerVote::Up {
                next.upvotes = next.upvotes.saturating_sub(1);
            }
            if self.viewer_vote == ViewerVote::Down {
                next.downvotes = next.downvotes.saturating_sub(1);
            }
            match intent {
                VoteDirection::Up => next.upvotes += 1,
                VoteDirection::Down => next.downvotes += 1,
            }
            next.viewer_vote = requested;
        }

        next
    }

    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}
