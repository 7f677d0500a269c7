use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

use super::draft::ContactDraft;
use super::error::ContactsError;
use super::methods::normalize_methods;
use super::repository::{ContactRepository, SharedRepository, StoreError};
use super::types::*;
use crate::sheet::{contacts_to_rows, export_to_xlsx};

pub struct ContactsService {
    repository: SharedRepository,
}

impl ContactsService {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }

    /// Runs one repository call on the blocking pool.
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T, ContactsError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ContactRepository) -> Result<T, StoreError> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || op(repository.as_ref()))
            .await
            .map_err(|e| {
                error!("Contact store task failed: {e}");
                ContactsError::System("The contact store could not complete the operation.".to_string())
            })?
            .map_err(ContactsError::from)
    }

    pub async fn list_contacts(&self, bookmarked_only: bool) -> Result<Vec<Contact>, ContactsError> {
        self.run(move |repo| repo.list(bookmarked_only)).await
    }

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Contact, ContactsError> {
        self.run(move |repo| repo.get(contact_id))
            .await?
            .ok_or(ContactsError::NotFound)
    }

    pub async fn create_contact(&self, request: CreateContactRequest) -> Result<Contact, ContactsError> {
        let candidate = NewContact {
            name: require_name(&request.name)?,
            is_bookmarked: request.is_bookmarked,
            methods: normalize_methods(&request.methods)?,
        };

        let ids = self.run(move |repo| repo.insert_batch(&[candidate])).await?;
        let id = ids.into_iter().next().ok_or_else(|| {
            ContactsError::System("The contact store did not return the new contact.".to_string())
        })?;
        info!("Created contact {id}");

        self.get_contact(id).await
    }

    pub async fn update_contact(
        &self,
        contact_id: Uuid,
        request: UpdateContactRequest,
    ) -> Result<Contact, ContactsError> {
        let patch = ContactPatch {
            name: request.name.as_deref().map(require_name).transpose()?,
            is_bookmarked: request.is_bookmarked,
        };

        self.run(move |repo| repo.update_fields(contact_id, &patch))
            .await?
            .ok_or(ContactsError::NotFound)
    }

    pub async fn delete_contact(&self, contact_id: Uuid) -> Result<(), ContactsError> {
        let deleted = self.run(move |repo| repo.delete(contact_id)).await?;
        if !deleted {
            return Err(ContactsError::NotFound);
        }

        info!("Deleted contact {contact_id}");
        Ok(())
    }

    pub async fn toggle_bookmark(&self, contact_id: Uuid) -> Result<Contact, ContactsError> {
        self.run(move |repo| repo.toggle_bookmark(contact_id))
            .await?
            .ok_or(ContactsError::NotFound)
    }

    /// Commits an edit buffer: creates a new contact, or updates the fields
    /// and swaps the method set of the one being edited in a single store
    /// call. Everything is validated before the first write.
    pub async fn save_draft(&self, draft: ContactDraft) -> Result<Contact, ContactsError> {
        let name = require_name(&draft.name)?;
        let inputs = draft.method_inputs();
        let methods = normalize_methods(&inputs)?;

        match draft.editing() {
            None => {
                self.create_contact(CreateContactRequest {
                    name,
                    is_bookmarked: draft.is_bookmarked,
                    methods: inputs,
                })
                .await
            }
            Some(contact_id) => {
                let patch = ContactPatch {
                    name: Some(name),
                    is_bookmarked: Some(draft.is_bookmarked),
                };
                let contact = self
                    .run(move |repo| repo.save_contact(contact_id, &patch, &methods))
                    .await?
                    .ok_or(ContactsError::NotFound)?;

                info!("Saved contact {contact_id}");
                Ok(contact)
            }
        }
    }

    /// Workbook bytes for the current (optionally bookmarked-only) listing.
    pub async fn export_contacts(&self, bookmarked_only: bool) -> Result<Vec<u8>, ContactsError> {
        let contacts = self.list_contacts(bookmarked_only).await?;
        let bytes = export_to_xlsx(&contacts_to_rows(&contacts))?;
        info!("Exported {} contacts", contacts.len());
        Ok(bytes)
    }
}

pub(crate) fn require_name(raw: &str) -> Result<String, ContactsError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ContactsError::Validation("Name is required.".to_string()));
    }
    Ok(name.to_string())
}
