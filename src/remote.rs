//! Remote translator contract.
//!
//! The scheduler only sees an opaque `call(prompt) -> text` RPC. Anything that
//! can answer a natural-language prompt (the Gemini client, a test double)
//! plugs in here.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::retry::Backoff;

/// Failures of a single remote call
#[derive(Error, Debug)]
pub enum RemoteError {
    /// No credential for the remote endpoint
    #[error("remote translator is not configured: missing API key")]
    NotConfigured,

    /// HTTP 429 or equivalent
    #[error("rate limited by remote translator: {0}")]
    RateLimited(String),

    /// Any other non-success response
    #[error("remote translator API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("failed to reach remote translator: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected response from remote translator: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    /// How the retry loop should react to this failure
    pub fn backoff(&self) -> Backoff {
        match self {
            RemoteError::NotConfigured => Backoff::Abort,
            RemoteError::RateLimited(_) => Backoff::RateLimited,
            RemoteError::Api { status: 429, .. } => Backoff::RateLimited,
            _ => Backoff::Transient,
        }
    }
}

/// An endpoint that turns an instruction prompt into free-form text
#[async_trait]
pub trait RemoteTranslator: Send + Sync {
    /// Send one prompt and return the raw model output
    async fn call(&self, prompt: &str) -> Result<String, RemoteError>;

    /// Whether a call has any chance of succeeding (credential present)
    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted translator used by unit tests across the crate.

    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted responses; once the script runs out it echoes
    /// `"<lang>:<text>"` built from the quoted text in the prompt.
    pub struct ScriptedRemote {
        script: Mutex<VecDeque<Result<String, RemoteError>>>,
        prompts: Mutex<Vec<String>>,
        latency: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        configured: bool,
    }

    impl ScriptedRemote {
        pub fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
                latency: Duration::from_millis(50),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                configured: true,
            }
        }

        pub fn unconfigured() -> Self {
            Self {
                configured: false,
                ..Self::new()
            }
        }

        pub fn with_script(self, responses: Vec<Result<String, RemoteError>>) -> Self {
            *self.script.lock() = responses.into();
            self
        }

        pub fn always_failing(self, attempts: usize) -> Self {
            let script = (0..attempts)
                .map(|_| {
                    Err(RemoteError::Api {
                        status: 500,
                        body: "boom".to_string(),
                    })
                })
                .collect();
            self.with_script(script)
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().clone()
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    /// Pull the quoted source text back out of a translation prompt
    pub fn quoted_text(prompt: &str) -> &str {
        let start = prompt.find('"').map(|i| i + 1).unwrap_or(0);
        let end = prompt.rfind('"').unwrap_or(prompt.len());
        if start <= end {
            &prompt[start..end]
        } else {
            prompt
        }
    }

    #[async_trait]
    impl RemoteTranslator for ScriptedRemote {
        async fn call(&self, prompt: &str) -> Result<String, RemoteError> {
            self.prompts.lock().push(prompt.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.latency).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let scripted = self.script.lock().pop_front();
            match scripted {
                Some(response) => response,
                None => Ok(format!("translated:{}", quoted_text(prompt))),
            }
        }

        fn is_configured(&self) -> bool {
            self.configured
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_backoff() {
        let error = RemoteError::RateLimited("quota".to_string());
        assert_eq!(error.backoff(), Backoff::RateLimited);
    }

    #[test]
    fn test_api_429_is_rate_limited() {
        let error = RemoteError::Api {
            status: 429,
            body: String::new(),
        };
        assert_eq!(error.backoff(), Backoff::RateLimited);
    }

    #[test]
    fn test_other_failures_are_transient() {
        let api = RemoteError::Api {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(api.backoff(), Backoff::Transient);
        assert_eq!(
            RemoteError::Timeout(Duration::from_secs(1)).backoff(),
            Backoff::Transient
        );
        assert_eq!(
            RemoteError::MalformedResponse("no candidates".to_string()).backoff(),
            Backoff::Transient
        );
    }

    #[test]
    fn test_not_configured_aborts() {
        assert_eq!(RemoteError::NotConfigured.backoff(), Backoff::Abort);
    }

    #[test]
    fn test_error_display_mentions_status() {
        let error = RemoteError::Api {
            status: 500,
            body: "Internal".to_string(),
        };
        assert!(error.to_string().contains("500"));
        assert!(error.to_string().contains("Internal"));
    }
}
