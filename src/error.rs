use std::fmt;

use thiserror::Error;

/// Pipeline stage used to tag timeouts so callers can tell which external
/// call stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ScriptGeneration,
    Synthesis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::ScriptGeneration => write!(f, "script generation"),
            Stage::Synthesis => write!(f, "speech synthesis"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad or unknown request parameter. Reported before any external call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Heuristics table miss or missing credentials. Fatal to the run.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Script-generation capability failure. No fallback between providers.
    #[error("script generation failed ({provider}): {detail}")]
    Generation { provider: String, detail: String },

    /// Speech capability failure, tagged with the failing segment index.
    /// Aborts the whole run; partial audio is never returned.
    #[error("speech synthesis failed on segment {segment} ({provider}): {detail}")]
    Synthesis {
        segment: usize,
        provider: String,
        detail: String,
    },

    #[error("{stage} timed out after {seconds}s")]
    Timeout { stage: Stage, seconds: u64 },

    /// Final WAV encode failure. Internal, not an external-capability error.
    #[error("audio encoding failed: {0}")]
    Encoding(String),

    /// Sink failure. The computed audio stays valid and may be re-delivered.
    #[error("delivery failed: {0}")]
    Delivery(String),
}
