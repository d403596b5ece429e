//! Error types for the ragline domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. The taxonomy mirrors how
//! failures are handled: provider and vector errors are recoverable at the
//! turn level, tool errors are isolated to a single call, and protocol
//! violations abort the turn.

use thiserror::Error;

/// The top-level error type for all ragline operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors (LLM completion / embedding API) ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Vector store / embedding errors ---
    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Protocol violations (correlation-id mismatch) ---
    #[error("Protocol violation in turn {turn_id}: {detail}")]
    Protocol { turn_id: String, detail: String },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Vector-layer errors.
///
/// `EmbeddingFailed` and `StoreFailed` are deliberately separate variants so
/// callers can tell "embedding service unreachable" apart from "store
/// unreachable".
#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Vector store operation failed: {0}")]
    StoreFailed(String),

    #[error("Store returned misaligned results: {0}")]
    ShapeMismatch(String),

    #[error("Invalid document batch: {0}")]
    InvalidBatch(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn vector_error_variants_are_distinguishable() {
        let embed = VectorError::EmbeddingFailed("connection refused".into());
        let store = VectorError::StoreFailed("connection refused".into());
        assert!(embed.to_string().contains("Embedding"));
        assert!(store.to_string().contains("store"));
        assert!(matches!(embed, VectorError::EmbeddingFailed(_)));
        assert!(matches!(store, VectorError::StoreFailed(_)));
    }

    #[test]
    fn protocol_error_carries_turn_id() {
        let err = Error::Protocol {
            turn_id: "turn-42".into(),
            detail: "result id call_x matches no request".into(),
        };
        assert!(err.to_string().contains("turn-42"));
        assert!(err.to_string().contains("call_x"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::Timeout {
            tool_name: "current_time".into(),
            timeout_secs: 5,
        });
        assert!(err.to_string().contains("current_time"));
        assert!(err.to_string().contains("5"));
    }
}
