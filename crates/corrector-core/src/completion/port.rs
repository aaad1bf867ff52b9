use async_trait::async_trait;

use crate::{completion::types::CompletionRequest, Result};

/// Text-completion backend port.
///
/// OpenRouter is the first implementation; anything that can turn a
/// system/user instruction pair into text fits behind this interface.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// One request/response exchange. Returns the raw completion text with
    /// surrounding whitespace removed; the caller sanitizes further.
    async fn complete(&self, req: CompletionRequest) -> Result<String>;
}
