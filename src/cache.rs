//! In-memory translation cache keyed by (source text, target language).
//! Bounded LRU; capacity 0 means unbounded. Nothing survives a restart.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

/// Identity of one translation result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    source_text: String,
    target_language: String,
}

impl CacheKey {
    pub fn new(source_text: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            target_language: target_language.into(),
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }
}

pub struct TranslationCache {
    inner: Mutex<LruCache<CacheKey, String>>,
}

impl TranslationCache {
    pub fn new(capacity: usize) -> Self {
        let cache = match NonZeroUsize::new(capacity) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            inner: Mutex::new(cache),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Look up a cached translation.
    pub fn lookup(&self, key: &CacheKey) -> Option<String> {
        self.inner.lock().get(key).cloned()
    }

    /// Store a translation, replacing any previous value for the key.
    pub fn store(&self, key: CacheKey, translated_text: String) {
        self.inner.lock().put(key, translated_text);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_pairs_share_a_key() {
        assert_eq!(CacheKey::new("Hello", "hindi"), CacheKey::new("Hello", "hindi"));
        assert_ne!(CacheKey::new("Hello", "hindi"), CacheKey::new("Hello", "tamil"));
    }

    #[test]
    fn test_key_does_not_merge_fields() {
        // A naive "text_lang" key would collide here
        assert_ne!(CacheKey::new("a_b", "c"), CacheKey::new("a", "b_c"));
    }

    #[test]
    fn test_lookup_miss_then_hit() {
        let cache = TranslationCache::default();
        let key = CacheKey::new("Hello", "hindi");

        assert!(cache.lookup(&key).is_none());
        cache.store(key.clone(), "नमस्ते".to_string());
        assert_eq!(cache.lookup(&key).as_deref(), Some("नमस्ते"));
    }

    #[test]
    fn test_store_overwrites() {
        let cache = TranslationCache::default();
        let key = CacheKey::new("Hello", "tamil");

        cache.store(key.clone(), "first".to_string());
        cache.store(key.clone(), "second".to_string());

        assert_eq!(cache.lookup(&key).as_deref(), Some("second"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lookup_has_no_side_effect_on_content() {
        let cache = TranslationCache::default();
        let key = CacheKey::new("Bye", "hindi");
        cache.lookup(&key);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_bounded_cache_evicts_least_recent() {
        let cache = TranslationCache::new(2);
        let a = CacheKey::new("a", "hindi");
        let b = CacheKey::new("b", "hindi");
        let c = CacheKey::new("c", "hindi");

        cache.store(a.clone(), "A".to_string());
        cache.store(b.clone(), "B".to_string());
        // Touch `a` so `b` becomes least recently used
        cache.lookup(&a);
        cache.store(c.clone(), "C".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.lookup(&b).is_none());
        assert!(cache.lookup(&a).is_some());
        assert!(cache.lookup(&c).is_some());
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let cache = TranslationCache::unbounded();
        for i in 0..1_000 {
            cache.store(CacheKey::new(i.to_string(), "tamil"), i.to_string());
        }
        assert_eq!(cache.len(), 1_000);
    }
}
