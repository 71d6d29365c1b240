use thiserror::Error;

/// Errors produced while loading, assessing or correcting a detection table.
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is missing or a cell could not be parsed.
    #[error("Malformed table at line {line}, column `{column}`: {reason}")]
    MalformedTable {
        line: usize,
        column: String,
        reason: String,
    },

    /// Metrics were requested over zero tracks.
    #[error("No tracks to assess")]
    EmptyInput,

    /// A required input (source video or detection table) does not exist.
    #[error("Upstream input unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An operator remap request could not be understood.
    #[error("Invalid remap request: {0}")]
    InvalidRemap(String),

    /// The external renderer or transcoder failed.
    #[error("Render error: {0}")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(
        line: usize,
        column: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedTable {
            line,
            column: column.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for trackcheck operations.
pub type Result<T> = std::result::Result<T, Error>;
