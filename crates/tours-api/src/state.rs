use std::sync::Arc;

use tours_store::Collection;

pub const TOURS_COLLECTION: &str = "tours";

#[derive(Clone)]
pub struct AppState {
    pub tours: Arc<Collection>,
}

impl AppState {
    pub fn new(tours: Collection) -> Self {
        Self {
            tours: Arc::new(tours),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Collection::new(TOURS_COLLECTION))
    }
}
