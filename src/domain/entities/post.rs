use super::user::UserRef;
use super::vote::VoteState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: UserRef,
    #[serde(flatten)]
    pub votes: VoteState,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_edited: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Sort orders accepted by the post list endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    New,
    Top,
    Relevance,
}

impl PostSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSort::New => "new",
            PostSort::Top => "top",
            PostSort::Relevance => "relevance",
        }
    }
}
