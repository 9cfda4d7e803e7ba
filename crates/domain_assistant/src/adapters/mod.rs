//! Completion service adapters
//!
//! - **GeminiAdapter**: calls the `generateContent` REST endpoint over reqwest
//! - **MockCompletionPort**: scripted replies for tests (re-exported from the ports module)

pub mod gemini;

pub use crate::ports::mock::MockCompletionPort;
pub use gemini::{GeminiAdapter, GeminiConfig};
