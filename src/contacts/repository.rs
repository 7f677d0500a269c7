use std::sync::Arc;
use uuid::Uuid;

use super::types::{Contact, ContactPatch, NewContact, NewMethod};

/// Width of every text column in the contact tables.
pub const MAX_TEXT_LEN: usize = 191;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection unavailable: {0}")]
    Connection(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("stored row is invalid: {0}")]
    Corrupt(String),
}

/// Persistence seam for contacts and their methods.
///
/// Every method is one unit of work: multi-statement operations commit
/// completely or not at all, and a reader never observes a contact with a
/// half-written method set. Operations on a missing id return `Ok(None)` /
/// `Ok(false)` and leave the store untouched.
pub trait ContactRepository: Send + Sync {
    /// Contacts ordered bookmarked first, then most recently updated.
    fn list(&self, bookmarked_only: bool) -> Result<Vec<Contact>, StoreError>;

    fn get(&self, id: Uuid) -> Result<Option<Contact>, StoreError>;

    /// Creates every candidate with its methods in one transaction and
    /// returns the new ids in input order.
    fn insert_batch(&self, batch: &[NewContact]) -> Result<Vec<Uuid>, StoreError>;

    fn update_fields(&self, id: Uuid, patch: &ContactPatch) -> Result<Option<Contact>, StoreError>;

    /// Deletes the contact and, with it, every method it owns.
    fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Flips the bookmark flag with a single conditional write.
    fn toggle_bookmark(&self, id: Uuid) -> Result<Option<Contact>, StoreError>;

    /// Applies `patch` and swaps the whole method set for `methods` in one
    /// unit of work: either both land or neither does.
    fn save_contact(
        &self,
        id: Uuid,
        patch: &ContactPatch,
        methods: &[NewMethod],
    ) -> Result<Option<Contact>, StoreError>;

    /// Swaps the whole method set of a contact for `methods`.
    fn replace_methods(&self, id: Uuid, methods: &[NewMethod]) -> Result<Option<Contact>, StoreError> {
        self.save_contact(id, &ContactPatch::default(), methods)
    }
}

pub type SharedRepository = Arc<dyn ContactRepository>;
