//! Outbound text-generation providers.
//!
//! `TextModel` is the seam between the dispatcher and the network: production
//! wires in `GeminiClient`, tests wire in scripted mocks.

pub mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

/// A text-generation backend addressed by model identifier.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate one reply.  Errors carry the backend's message verbatim so
    /// callers can classify availability failures by wording.
    async fn generate(
        &self,
        model_id: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> anyhow::Result<String>;
}
