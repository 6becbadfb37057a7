//! Error types for the HUD controller.

/// Top-level error type for the session-orchestration engine.
///
/// No variant is fatal to a session: every failure path recovers locally
/// (degraded-mode message, skipped poll tick, apology line, or an empty
/// starting transcript).
#[derive(Debug, thiserror::Error)]
pub enum HudError {
    /// Chat request failed or returned a non-success status.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Stats or notification fetch failed; the tick is skipped.
    #[error("poll failed: {0}")]
    PollFailed(String),

    /// Hardware capability absent, or the user denied permission.
    #[error("capability denied: {0}")]
    CapabilityDenied(String),

    /// Startup history fetch failed; the session starts empty.
    #[error("hydration failed: {0}")]
    HydrationFailed(String),

    /// Speech synthesis error.
    #[error("speech error: {0}")]
    Speech(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HudError>;
