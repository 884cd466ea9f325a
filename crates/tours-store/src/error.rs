use tours_query::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("write lock poisoned")]
    Poisoned,
}
