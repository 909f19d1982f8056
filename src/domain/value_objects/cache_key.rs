use crate::domain::entities::PostSort;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite cache identifier: entity type + id + query parameters,
/// e.g. `post:123` or `comments:post:123:page:1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(value: String) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("Cache key cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn post(post_id: &str) -> Self {
        Self(format!("post:{post_id}"))
    }

    pub fn posts_page(sort: PostSort, page: u32) -> Self {
        Self(format!("posts:sort:{}:page:{page}", sort.as_str()))
    }

    pub fn posts_by_user(user_id: &str, page: u32) -> Self {
        Self(format!("posts:user:{user_id}:page:{page}"))
    }

    pub fn comment(comment_id: &str) -> Self {
        Self(format!("comment:{comment_id}"))
    }

    pub fn comments_for_post(post_id: &str, page: u32) -> Self {
        Self(format!("comments:post:{post_id}:page:{page}"))
    }

    pub fn comments_by_user(user_id: &str, page: u32) -> Self {
        Self(format!("comments:user:{user_id}:page:{page}"))
    }

    pub fn replies(comment_id: &str, page: u32) -> Self {
        Self(format!("replies:comment:{comment_id}:page:{page}"))
    }

    pub fn comment_count(post_id: &str) -> Self {
        Self(format!("commentCount:post:{post_id}"))
    }

    pub fn reply_count(comment_id: &str) -> Self {
        Self(format!("repliesCount:comment:{comment_id}"))
    }

    pub fn user(user_id: &str) -> Self {
        Self(format!("user:{user_id}"))
    }

    pub fn user_self() -> Self {
        Self("user:self".to_string())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Key pattern used by invalidation: either an exact key or a prefix
/// followed by `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPattern(String);

impl KeyPattern {
    pub fn exact(key: CacheKey) -> Self {
        Self(key.0)
    }

    pub fn prefix(prefix: &str) -> Self {
        Self(format!("{prefix}*"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, key: &CacheKey) -> bool {
        match self.0.strip_suffix('*') {
            Some(prefix) => key.0.starts_with(prefix),
            None => key.0 == self.0,
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        assert!(CacheKey::new("  ".to_string()).is_err());
    }

    #[test]
    fn test_key_constructors_compose_segments() {
        assert_eq!(CacheKey::post("42").as_str(), "post:42");
        assert_eq!(
            CacheKey::comments_for_post("42", 1).as_str(),
            "comments:post:42:page:1"
        );
        assert_eq!(
            CacheKey::reply_count("c7").as_str(),
            "repliesCount:comment:c7"
        );
        assert_eq!(
            CacheKey::posts_page(PostSort::New, 2).as_str(),
            "posts:sort:new:page:2"
        );
    }

    #[test]
    fn test_exact_pattern_matches_only_itself() {
        let pattern = KeyPattern::exact(CacheKey::post("42"));
        assert!(pattern.matches(&CacheKey::post("42")));
        assert!(!pattern.matches(&CacheKey::post("421")));
    }

    #[test]
    fn test_prefix_pattern_matches_all_pages() {
        let pattern = KeyPattern::prefix("comments:post:42:");
        assert!(pattern.matches(&CacheKey::comments_for_post("42", 1)));
        assert!(pattern.matches(&CacheKey::comments_for_post("42", 9)));
        assert!(!pattern.matches(&CacheKey::comments_for_post("43", 1)));
        assert!(!pattern.matches(&CacheKey::comment("42")));
    }
}
