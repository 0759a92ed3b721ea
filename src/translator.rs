//! Translation facade: the single entry point UI code calls.
//!
//! Flow: fast path (base language or empty text) → cache → join an identical
//! request already in flight → enqueue on the serial scheduler. Successful
//! results are written to the cache before the caller sees them. Every path
//! yields a string; failures surface as the untranslated source text.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join_all, BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheKey, TranslationCache};
use crate::config::Config;
use crate::metrics::TranslationMetrics;
use crate::remote::RemoteTranslator;
use crate::retry::RetryPolicy;
use crate::scheduler::{Outcome, Scheduler};

type PendingTranslation = Shared<BoxFuture<'static, Outcome>>;

/// Requests currently queued, by key. Entries hold weak handles so that a
/// request every caller has abandoned is released and skipped by the queue.
type InFlight = Mutex<HashMap<CacheKey, (u64, WeakShared<BoxFuture<'static, Outcome>>)>>;

/// Removes its in-flight entry when the shared request finishes or is dropped.
struct InFlightEntry {
    in_flight: Arc<InFlight>,
    key: CacheKey,
    ticket: u64,
}

impl Drop for InFlightEntry {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        if in_flight
            .get(&self.key)
            .is_some_and(|(current, _)| *current == self.ticket)
        {
            in_flight.remove(&self.key);
        }
    }
}

/// Tunables for a `Translator`
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Language code whose text is returned untouched
    pub base_language: String,
    /// Maximum cached translations; 0 disables eviction
    pub cache_capacity: usize,
    /// Pause between consecutive queued remote calls
    pub request_spacing: Duration,
    pub retry: RetryPolicy,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            base_language: "english".to_string(),
            cache_capacity: 10_000,
            request_spacing: Duration::from_millis(200),
            retry: RetryPolicy::standard(),
        }
    }
}

impl TranslatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_language: config.base_language.clone(),
            cache_capacity: config.cache_capacity,
            request_spacing: config.request_spacing(),
            retry: config.retry_policy(),
        }
    }

    pub fn with_base_language(mut self, code: impl Into<String>) -> Self {
        self.base_language = code.into();
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_request_spacing(mut self, spacing: Duration) -> Self {
        self.request_spacing = spacing;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

enum Lookup {
    Cached(String),
    Pending(PendingTranslation),
}

/// Process-wide translation service. Construct once and share by reference
/// (or `Arc`); dropping it shuts the queue down once it drains.
pub struct Translator {
    base_language: String,
    remote_configured: bool,
    warned_unconfigured: AtomicBool,
    cache: Arc<TranslationCache>,
    scheduler: Scheduler,
    in_flight: Arc<InFlight>,
    next_ticket: AtomicU64,
    metrics: Arc<TranslationMetrics>,
}

impl Translator {
    /// Build a translator and start its queue on the current Tokio runtime.
    pub fn new(remote: Arc<dyn RemoteTranslator>, options: TranslatorOptions) -> Self {
        let metrics = Arc::new(TranslationMetrics::new());
        let remote_configured = remote.is_configured();
        if !remote_configured {
            warn!("Remote translator has no API key; all text will stay untranslated");
        }

        let cache = Arc::new(TranslationCache::new(options.cache_capacity));
        debug!(capacity = cache.capacity(), "Translation cache ready");

        let scheduler = Scheduler::spawn(
            remote,
            options.retry,
            options.request_spacing,
            Arc::clone(&metrics),
        );

        Self {
            base_language: options.base_language,
            remote_configured,
            warned_unconfigured: AtomicBool::new(false),
            cache,
            scheduler,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: AtomicU64::new(0),
            metrics,
        }
    }

    /// Translate `source_text` into `target_language`.
    ///
    /// Never fails: when translation is skipped or impossible the source text
    /// is returned unchanged.
    pub async fn translate(&self, source_text: &str, target_language: &str) -> String {
        if source_text.is_empty() || target_language == self.base_language {
            return source_text.to_string();
        }

        if !self.remote_configured {
            if !self.warned_unconfigured.swap(true, Ordering::Relaxed) {
                warn!("Skipping translation: remote translator is not configured");
            }
            self.metrics.record_fallback();
            return source_text.to_string();
        }

        let key = CacheKey::new(source_text, target_language);
        match self.lookup_or_enqueue(&key) {
            Lookup::Cached(translated) => translated,
            Lookup::Pending(pending) => pending.await.into_text(),
        }
    }

    /// Translate every value of `fields` into `target_language`.
    ///
    /// Each field is an independent `translate` call, so cached fields cost
    /// nothing and the rest are queued in key order.
    pub async fn translate_batch(
        &self,
        fields: &BTreeMap<String, String>,
        target_language: &str,
    ) -> BTreeMap<String, String> {
        let translations = join_all(
            fields
                .values()
                .map(|text| self.translate(text, target_language)),
        )
        .await;

        fields.keys().cloned().zip(translations).collect()
    }

    /// Whether any request is queued or being serviced
    pub fn is_translating(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn base_language(&self) -> &str {
        &self.base_language
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    fn lookup_or_enqueue(&self, key: &CacheKey) -> Lookup {
        // Cache is checked under the in-flight lock: a finished request stores
        // its result before removing its entry, so it is never missed by both.
        let mut in_flight = self.in_flight.lock();

        if let Some(translated) = self.cache.lookup(key) {
            self.metrics.record_cache_hit();
            return Lookup::Cached(translated);
        }
        self.metrics.record_cache_miss();

        if let Some(pending) = in_flight.get(key).and_then(|(_, weak)| weak.upgrade()) {
            debug!(
                target_language = %key.target_language(),
                "Joining identical translation already in flight"
            );
            self.metrics.record_shared_in_flight();
            return Lookup::Pending(pending);
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let queued = self
            .scheduler
            .enqueue(key.source_text(), key.target_language());
        let entry = InFlightEntry {
            in_flight: Arc::clone(&self.in_flight),
            key: key.clone(),
            ticket,
        };
        let cache = Arc::clone(&self.cache);

        // Owned by the shared future, so the result is cached and the entry
        // cleared by whichever caller drives it to completion. If every caller
        // drops it, the entry goes with it and the queue skips the request.
        let pending = async move {
            let outcome = queued.await;
            if let Outcome::Translated(translated) = &outcome {
                cache.store(entry.key.clone(), translated.clone());
            }
            drop(entry);
            outcome
        }
        .boxed()
        .shared();

        if let Some(weak) = pending.downgrade() {
            in_flight.insert(key.clone(), (ticket, weak));
        }

        Lookup::Pending(pending)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().len()
    }
}
