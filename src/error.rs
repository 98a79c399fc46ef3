use thiserror::Error;

/// Longest slice of an error body carried into messages
const MAX_BODY_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not reach the analysis service: {0}")]
    Transport(String),

    #[error("Analysis service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response from the analysis service: {0}")]
    Parse(String),
}

impl AnalysisError {
    /// Build an `Http` error, truncating long bodies.
    pub fn http(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(MAX_BODY_CHARS) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        AnalysisError::Http { status, body }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AnalysisError::Parse(e.to_string())
        } else if e.is_timeout() {
            AnalysisError::Transport(format!("request timed out: {e}"))
        } else {
            AnalysisError::Transport(e.to_string())
        }
    }
}
