//! Caching layer for giftwise-runtime.
//!
//! Keeps normalized provider results for repeated requests. Fallback
//! results are never cached so a recovered provider is used again.

use giftwise_core::{GiftIdea, GiftRequest};
use moka::future::Cache;
use std::time::Duration;

use crate::config::CacheConfig;

/// Cache key: the request with whitespace and blank interests removed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    occasion: String,
    interests: Vec<String>,
}

impl CacheKey {
    pub fn new(request: &GiftRequest) -> Self {
        Self {
            occasion: request.occasion.trim().to_string(),
            interests: request.clean_interests(),
        }
    }
}

/// Result cache using moka.
pub struct IdeaCache {
    cache: Cache<CacheKey, Vec<GiftIdea>>,
}

impl IdeaCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Vec<GiftIdea>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: CacheKey, ideas: Vec<GiftIdea>) {
        self.cache.insert(key, ideas).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for IdeaCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = IdeaCache::default();
        let key = CacheKey::new(&GiftRequest::new("Birthday", ["Art"]));

        assert!(cache.get(&key).await.is_none());

        let ideas = vec![GiftIdea::new("Sketchbook", "For doodles", "Budget", "9")];
        cache.insert(key.clone(), ideas.clone()).await;

        assert_eq!(cache.get(&key).await, Some(ideas));
    }

    #[test]
    fn test_key_ignores_whitespace_and_blanks() {
        let a = CacheKey::new(&GiftRequest::new(" Birthday ", ["Art", " ", "Music "]));
        let b = CacheKey::new(&GiftRequest::new("Birthday", ["Art", "Music"]));
        assert_eq!(a, b);

        let reordered = CacheKey::new(&GiftRequest::new("Birthday", ["Music", "Art"]));
        assert_ne!(a, reordered);
    }
}
