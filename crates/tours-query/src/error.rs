#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("projection cannot mix inclusion and exclusion: {0:?}")]
    MixedProjection(String),

    #[error(transparent)]
    Filter(#[from] FilterParseError),
}

/// Parse error for filter documents.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("filter parse error: {0}")]
pub struct FilterParseError(pub String);
