//! Assistant errors
//!
//! Every variant is recoverable: a failed suggestion leaves the document
//! untouched and the caller may simply retry or edit by hand.

use thiserror::Error;

use core_kernel::PortError;
use domain_document::DocumentError;

#[derive(Debug, Error)]
pub enum AssistantError {
    /// Neither a prompt nor an image was supplied
    #[error("A prompt or at least one image is required")]
    EmptyPrompt,

    /// Receipt interpretation needs a photo
    #[error("Receipt interpretation requires an image")]
    MissingImage,

    /// The completion service failed
    #[error("Suggestion service error: {0}")]
    Port(#[from] PortError),

    /// The service answered with something that does not fit the expected shape
    #[error("Malformed suggestion: {0}")]
    MalformedResponse(String),

    /// Applying the suggestion to the document was rejected
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl AssistantError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AssistantError::MalformedResponse(message.into())
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            AssistantError::Port(e) => e.is_transient(),
            AssistantError::MalformedResponse(_) => true,
            _ => false,
        }
    }
}
