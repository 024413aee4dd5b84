use async_trait::async_trait;

use crate::error::AiError;

// =============================================================================
// ContentGenerator Trait
// =============================================================================

/// A text-in, text-out model capability.
///
/// Callers must tolerate this being absent entirely; nothing downstream should
/// require a live model to function.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short identifier used in logs and event `source` fields.
    fn name(&self) -> &str;

    async fn generate_content(&self, prompt: &str) -> Result<String, AiError>;
}
