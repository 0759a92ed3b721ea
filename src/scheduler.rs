//! Serial translation queue.
//!
//! One worker task owns the FIFO queue and services a single item at a time,
//! so there is never more than one remote call in flight no matter how many
//! callers enqueue concurrently. Each item resolves exactly once through its
//! own `oneshot` reply channel; failures resolve with the untranslated text.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::gemini::build_translation_prompt;
use crate::i18n::LanguageRegistry;
use crate::metrics::TranslationMetrics;
use crate::remote::{RemoteError, RemoteTranslator};
use crate::retry::{with_backoff, RetryPolicy};
use crate::sanitize::{sanitize_response, Sanitized};

/// How a queued request was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The remote produced a usable translation
    Translated(String),
    /// Translation was not possible; carries the original source text
    Untranslated(String),
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self {
            Outcome::Translated(text) | Outcome::Untranslated(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Outcome::Translated(text) | Outcome::Untranslated(text) => text,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Outcome::Translated(_))
    }
}

struct QueueItem {
    source_text: String,
    target_language: String,
    reply: oneshot::Sender<Outcome>,
    enqueued_at: Instant,
    _pending: PendingGuard,
}

/// Counts an item as pending for as long as it exists, however it ends:
/// serviced, skipped, rejected by a closed queue, or dropped with a dead worker.
struct PendingGuard(Arc<AtomicUsize>);

impl PendingGuard {
    fn new(pending: &Arc<AtomicUsize>) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(pending))
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to the translation queue. Cheap to clone; the worker stops once
/// every handle is dropped and the queue has drained.
#[derive(Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<QueueItem>,
    pending: Arc<AtomicUsize>,
}

impl Scheduler {
    /// Start the queue worker on the current Tokio runtime.
    ///
    /// `spacing` is the pause inserted between consecutive remote calls when
    /// more work is already waiting.
    pub fn spawn(
        remote: Arc<dyn RemoteTranslator>,
        policy: RetryPolicy,
        spacing: Duration,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = Worker {
            remote,
            policy,
            spacing,
            metrics,
        };
        tokio::spawn(worker.run(rx));

        Self { tx, pending }
    }

    /// Append a request to the queue.
    ///
    /// The item is queued immediately, before the returned future is first
    /// polled, so queue order is call order. The future never fails: if the
    /// worker is gone it resolves with the untranslated source text.
    pub fn enqueue(
        &self,
        source_text: &str,
        target_language: &str,
    ) -> impl Future<Output = Outcome> + Send + 'static {
        let (reply, receiver) = oneshot::channel();
        let fallback = source_text.to_string();

        let item = QueueItem {
            source_text: source_text.to_string(),
            target_language: target_language.to_string(),
            reply,
            enqueued_at: Instant::now(),
            _pending: PendingGuard::new(&self.pending),
        };

        if self.tx.send(item).is_err() {
            // Dropping the rejected item drops its reply sender, so the
            // receiver below resolves to the fallback.
            warn!("Translation queue is closed; returning untranslated text");
        }

        async move {
            receiver.await.unwrap_or_else(|_| {
                warn!("Translation request dropped by queue; returning untranslated text");
                Outcome::Untranslated(fallback)
            })
        }
    }

    /// Requests queued or being serviced
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.pending() > 0
    }
}

struct Worker {
    remote: Arc<dyn RemoteTranslator>,
    policy: RetryPolicy,
    spacing: Duration,
    metrics: Arc<TranslationMetrics>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<QueueItem>) {
        info!("Translation queue started");

        while let Some(item) = rx.recv().await {
            self.service(item).await;

            // Keep draining while work is already waiting, pausing between
            // calls to stay under the remote rate limit. An item that arrives
            // at an idle queue starts right away.
            while let Ok(next) = rx.try_recv() {
                sleep(self.spacing).await;
                self.service(next).await;
            }
        }

        debug!("Translation queue closed");
    }

    async fn service(&self, item: QueueItem) {
        let QueueItem {
            source_text,
            target_language,
            reply,
            enqueued_at,
            _pending,
        } = item;

        if reply.is_closed() {
            debug!(target_language = %target_language, "Skipping translation nobody is waiting for");
            return;
        }

        debug!(
            target_language = %target_language,
            waited_ms = enqueued_at.elapsed().as_millis() as u64,
            "Servicing translation request"
        );

        let outcome = self.translate(&source_text, &target_language).await;
        if !outcome.is_translated() {
            self.metrics.record_fallback();
        }

        // A send error only means the caller stopped waiting
        let _ = reply.send(outcome);
    }

    async fn translate(&self, source_text: &str, target_language: &str) -> Outcome {
        let language_name = LanguageRegistry::get().prompt_name(target_language);
        let prompt = build_translation_prompt(source_text, language_name);

        let remote = &self.remote;
        let metrics = &self.metrics;
        let prompt = prompt.as_str();
        let attempt_timeout = self.policy.attempt_timeout;

        let result = with_backoff(
            &self.policy,
            &format!("Translation to {}", target_language),
            || async move {
                metrics.record_api_call();
                let result = match timeout(attempt_timeout, remote.call(prompt)).await {
                    Ok(result) => result,
                    Err(_) => Err(RemoteError::Timeout(attempt_timeout)),
                };
                if result.is_err() {
                    metrics.record_api_failure();
                }
                result
            },
            RemoteError::backoff,
        )
        .await;

        match result {
            Ok(raw) => match sanitize_response(Some(&raw), source_text) {
                Sanitized::Text(translated) => Outcome::Translated(translated),
                Sanitized::Fallback(original) => {
                    warn!(target_language = %target_language, "Remote returned an empty translation");
                    Outcome::Untranslated(original)
                }
            },
            Err(e) => {
                warn!(
                    target_language = %target_language,
                    "Translation failed, showing original text: {}", e
                );
                Outcome::Untranslated(source_text.to_string())
            }
        }
    }
}
