use std::path::Path;

use tours_store::{Collection, StoreError};

use crate::convert::json_to_document;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("seed file is not a JSON array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("seed entry {0} is not an object")]
    NotAnObject(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Load a JSON array of tours into the collection. Returns how many were inserted.
pub fn load_seed_file(tours: &Collection, path: &Path) -> Result<usize, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

    let docs = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| json_to_document(entry).ok_or(SeedError::NotAnObject(i)))
        .collect::<Result<Vec<_>, _>>()?;

    let inserted = tours.insert_many(docs)?.len();
    tracing::info!(path = %path.display(), inserted, "seeded tours");
    Ok(inserted)
}
