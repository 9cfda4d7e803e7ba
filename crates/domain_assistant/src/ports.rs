//! Assistant Ports
//!
//! The completion service is an external collaborator reached through the
//! `CompletionPort` trait. The service layer only ever sees the port, so the
//! HTTP adapter can be swapped for the in-memory mock in tests.
//!
//! ```rust,ignore
//! let port: Arc<dyn CompletionPort> = Arc::new(GeminiAdapter::new(config)?);
//! let service = SuggestionService::new(port);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};

use crate::request::CompletionRequest;

/// A text/vision completion service
#[async_trait]
pub trait CompletionPort: DomainPort {
    /// Sends one request and returns the raw text of the first candidate
    async fn complete(&self, request: CompletionRequest) -> Result<String, PortError>;
}

/// Scripted implementation of CompletionPort
///
/// Replies are handed out in order; every request is kept so callers can
/// inspect what was sent.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable};

    #[derive(Debug, Default)]
    pub struct MockCompletionPort {
        replies: Mutex<VecDeque<Result<String, PortError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockCompletionPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// A port that answers every request with the given replies in turn
        pub fn with_replies<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let port = Self::new();
            for reply in replies {
                port.push_reply(reply);
            }
            port
        }

        pub fn push_reply(&self, reply: impl Into<String>) {
            if let Ok(mut replies) = self.replies.lock() {
                replies.push_back(Ok(reply.into()));
            }
        }

        pub fn push_error(&self, error: PortError) {
            if let Ok(mut replies) = self.replies.lock() {
                replies.push_back(Err(error));
            }
        }

        /// Requests received so far
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests
                .lock()
                .map(|requests| requests.clone())
                .unwrap_or_default()
        }
    }

    impl DomainPort for MockCompletionPort {}

    #[async_trait]
    impl HealthCheckable for MockCompletionPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::now(
                "mock-completion-port",
                AdapterHealth::Healthy,
                Some("Mock adapter always healthy".to_string()),
            )
        }
    }

    #[async_trait]
    impl CompletionPort for MockCompletionPort {
        async fn complete(&self, request: CompletionRequest) -> Result<String, PortError> {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            self.replies
                .lock()
                .ok()
                .and_then(|mut replies| replies.pop_front())
                .unwrap_or_else(|| {
                    Err(PortError::ServiceUnavailable {
                        service: "mock-completion-port".to_string(),
                    })
                })
        }
    }
}
