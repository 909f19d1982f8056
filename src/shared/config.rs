use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub limits: ContentLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries held before LRU eviction kicks in.
    pub max_entries: usize,
    /// Seconds a confirmed entry is served without revalidation.
    pub fresh_ttl: u64,
    /// Default page size for list views.
    pub default_page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentLimits {
    pub title_min_chars: usize,
    pub title_max_chars: usize,
    pub post_body_max_chars: usize,
    pub comment_max_chars: usize,
    pub bio_max_chars: usize,
    pub feedback_max_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            limits: ContentLimits::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 2048,
            fresh_ttl: 120, // 2 minutes, matching list view staleTime
            default_page_size: 10,
        }
    }
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            title_min_chars: 3,
            title_max_chars: 300,
            post_body_max_chars: 40_000,
            comment_max_chars: 10_000,
            bio_max_chars: 500,
            feedback_max_chars: 5_000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("KHIVE_CACHE_MAX_ENTRIES") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.max_entries = (value.max(1)) as usize;
            }
        }
        if let Ok(v) = std::env::var("KHIVE_CACHE_FRESH_TTL") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.fresh_ttl = value;
            }
        }
        if let Ok(v) = std::env::var("KHIVE_DEFAULT_PAGE_SIZE") {
            if let Some(value) = parse_u64(&v) {
                cfg.cache.default_page_size = value.clamp(1, 100) as u32;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cache.max_entries == 0 {
            return Err("Cache max_entries must be greater than 0".to_string());
        }
        if self.cache.default_page_size == 0 {
            return Err("Cache default_page_size must be greater than 0".to_string());
        }
        if self.limits.title_min_chars > self.limits.title_max_chars {
            return Err("title_min_chars must not exceed title_max_chars".to_string());
        }
        Ok(())
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_title_bounds_rejected() {
        let mut cfg = AppConfig::default();
        cfg.limits.title_min_chars = 500;
        assert!(cfg.validate().is_err());
    }
}
