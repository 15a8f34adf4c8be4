use thiserror::Error;

/// Errors from the external analyzer boundary.  These never reach the end
/// user: the strategy layer substitutes the deterministic fallback result.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No API key is configured for the remote analyzer.
    #[error("Analyzer API key is not configured")]
    NotConfigured,

    /// Reading the captured image from disk failed.
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure (connect, TLS, timeout).
    #[error("Analyzer transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The analyzer answered with a non-success status (quota, auth, ...).
    #[error("Analyzer returned HTTP status {0}")]
    Status(u16),

    /// The analyzer answered but the response carried no text.
    #[error("Analyzer response contained no text")]
    EmptyResponse,
}
