use std::sync::Arc;

use crate::contacts::{ContactsService, MemoryContactRepository, SharedRepository};

pub struct AppState {
    pub repository: SharedRepository,
}

impl AppState {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryContactRepository::new()))
    }

    /// Service bound to this state's store; cheap, built per request.
    pub fn contacts(&self) -> ContactsService {
        ContactsService::new(Arc::clone(&self.repository))
    }
}
