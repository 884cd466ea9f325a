mod collection;
mod error;
mod exec;

pub use collection::{CREATED_AT_FIELD, Collection, ID_FIELD, VERSION_FIELD};
pub use error::StoreError;
