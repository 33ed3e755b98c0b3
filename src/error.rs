use thiserror::Error;

/// Why a single GET failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The server answered with a non-2xx status.
    Status(u16),
    /// Connection, TLS, or body read failure.
    Transport(String),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Status(code) => write!(f, "HTTP {}", code),
            FetchFailure::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

/// Failures raised while fetching or extracting site content.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{failure} attempting to GET {url}")]
    Fetch { url: String, failure: FetchFailure },

    /// An expected markup element is missing (layout change or wrong page type).
    #[error("page structure: {0}")]
    Structure(String),

    /// A field was present but malformed.
    #[error("parse: {0}")]
    Parse(String),

    #[error("invalid selector: {0}")]
    Selector(String),
}

impl ScrapeError {
    pub fn structure(msg: impl Into<String>) -> Self {
        ScrapeError::Structure(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ScrapeError::Parse(msg.into())
    }
}
