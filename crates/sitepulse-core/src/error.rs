use thiserror::Error;

/// Why a collect payload was not stored.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("site not allowed: {0}")]
    SiteNotAllowed(String),

    #[error("store error: {0}")]
    Store(anyhow::Error),
}

impl IngestError {
    /// Stable machine-readable code for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::MissingField(_) => "missing_field",
            IngestError::SiteNotAllowed(_) => "site_not_allowed",
            IngestError::Store(_) => "internal_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}
