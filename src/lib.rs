//! Cached, serially-queued LLM translation for UI text.
//!
//! `Translator` is the entry point: it answers from the cache when it can,
//! otherwise queues the request on a scheduler that keeps at most one remote
//! call in flight, retries with backoff, and falls back to the original text
//! whenever translation fails.

pub mod cache;
pub mod config;
pub mod gemini;
pub mod i18n;
pub mod metrics;
pub mod preference;
pub mod remote;
pub mod retry;
pub mod sanitize;
pub mod scheduler;
pub mod translator;

pub use remote::{RemoteError, RemoteTranslator};
pub use scheduler::Outcome;
pub use translator::{Translator, TranslatorOptions};
