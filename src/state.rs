use crate::database::{UserRepository, WorkspaceRepository};
use crate::services::auth_service::JwtKeys;
use std::sync::Arc;

/// Shared handles passed to every request through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub workspaces: Arc<dyn WorkspaceRepository>,
    pub jwt: JwtKeys,
    pub bcrypt_cost: u32,
    pub cookie_secure: bool,
}

#[cfg(test)]
impl AppState {
    /// State backed by a fresh in-memory store, plus that store for direct setup.
    pub fn in_memory() -> (Self, Arc<crate::database::memory::MemoryStore>) {
        let store = Arc::new(crate::database::memory::MemoryStore::new());
        let state = AppState {
            users: store.clone(),
            workspaces: store.clone(),
            jwt: JwtKeys::new("test-secret", 1),
            bcrypt_cost: 4,
            cookie_secure: false,
        };
        (state, store)
    }
}
