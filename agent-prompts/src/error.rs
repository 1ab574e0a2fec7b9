//! Shared error type for prompt orchestration.

/// Result alias for prompt manager and system instruction operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// Errors that can occur while orchestrating prompts.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Prompt construction failed.
    #[error("prompt error: {reason}")]
    Other {
        /// Reason for the failure.
        reason: String,
    },
}
