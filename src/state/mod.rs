use std::sync::Arc;

use crate::dao::game_store::GameStore;

pub type SharedState = Arc<AppState>;

/// Central application state holding the storage backend chosen at start-up.
pub struct AppState {
    game_store: Arc<dyn GameStore>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(game_store: Arc<dyn GameStore>) -> SharedState {
        Arc::new(Self { game_store })
    }

    /// Handle to the installed game store.
    pub fn game_store(&self) -> Arc<dyn GameStore> {
        Arc::clone(&self.game_store)
    }
}
