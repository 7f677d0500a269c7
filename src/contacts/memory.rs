use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::repository::{ContactRepository, StoreError, MAX_TEXT_LEN};
use super::types::{Contact, ContactMethod, ContactPatch, NewContact, NewMethod};

/// In-process store used when no database is configured, and by tests.
///
/// A single lock guards the whole state. Writes are staged and validated
/// against the same constraints as the SQL schema before anything is applied,
/// so a failing batch leaves the state exactly as it was.
#[derive(Default)]
pub struct MemoryContactRepository {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    contacts: HashMap<Uuid, Contact>,
    last_tick: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing clock so "most recently updated" is never a tie
    /// between two separate writes.
    fn tick(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_tick {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_tick = Some(now);
        now
    }
}

impl MemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Connection("memory store lock poisoned".to_string()))
    }

    /// Number of stored methods pointing at `contact_id`, whoever owns them.
    pub fn method_count_for(&self, contact_id: Uuid) -> usize {
        self.lock()
            .map(|state| {
                state
                    .contacts
                    .values()
                    .flat_map(|c| c.methods.iter())
                    .filter(|m| m.contact_id == contact_id)
                    .count()
            })
            .unwrap_or(0)
    }
}

fn check_text(column: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Constraint(format!("{column} must not be blank")));
    }
    check_width(column, value)
}

fn check_width(column: &str, value: &str) -> Result<(), StoreError> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::Constraint(format!(
            "{column} exceeds {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn build_methods(contact_id: Uuid, methods: &[NewMethod]) -> Result<Vec<ContactMethod>, StoreError> {
    methods
        .iter()
        .map(|m| {
            check_text("contact_methods.value", &m.value)?;
            if let Some(label) = &m.label {
                check_width("contact_methods.label", label)?;
            }
            Ok(ContactMethod {
                id: Uuid::new_v4(),
                contact_id,
                method_type: m.method_type,
                value: m.value.clone(),
                label: m.label.clone(),
            })
        })
        .collect()
}

impl ContactRepository for MemoryContactRepository {
    fn list(&self, bookmarked_only: bool) -> Result<Vec<Contact>, StoreError> {
        let state = self.lock()?;
        let mut contacts: Vec<Contact> = state
            .contacts
            .values()
            .filter(|c| !bookmarked_only || c.is_bookmarked)
            .cloned()
            .collect();
        contacts.sort_by(|a, b| {
            b.is_bookmarked
                .cmp(&a.is_bookmarked)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(contacts)
    }

    fn get(&self, id: Uuid) -> Result<Option<Contact>, StoreError> {
        Ok(self.lock()?.contacts.get(&id).cloned())
    }

    fn insert_batch(&self, batch: &[NewContact]) -> Result<Vec<Uuid>, StoreError> {
        let mut state = self.lock()?;
        let now = state.tick();

        let mut staged = Vec::with_capacity(batch.len());
        for candidate in batch {
            check_text("contacts.name", &candidate.name)?;
            let id = Uuid::new_v4();
            staged.push(Contact {
                id,
                name: candidate.name.clone(),
                is_bookmarked: candidate.is_bookmarked,
                created_at: now,
                updated_at: now,
                methods: build_methods(id, &candidate.methods)?,
            });
        }

        let ids = staged.iter().map(|c| c.id).collect();
        state.contacts.extend(staged.into_iter().map(|c| (c.id, c)));
        Ok(ids)
    }

    fn update_fields(&self, id: Uuid, patch: &ContactPatch) -> Result<Option<Contact>, StoreError> {
        let mut state = self.lock()?;
        if !state.contacts.contains_key(&id) {
            return Ok(None);
        }
        if let Some(name) = &patch.name {
            check_text("contacts.name", name)?;
        }
        let now = state.tick();
        let Some(contact) = state.contacts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            contact.name = name.clone();
        }
        if let Some(flag) = patch.is_bookmarked {
            contact.is_bookmarked = flag;
        }
        contact.updated_at = now;
        Ok(Some(contact.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock()?.contacts.remove(&id).is_some())
    }

    fn toggle_bookmark(&self, id: Uuid) -> Result<Option<Contact>, StoreError> {
        let mut state = self.lock()?;
        if !state.contacts.contains_key(&id) {
            return Ok(None);
        }
        let now = state.tick();
        Ok(state.contacts.get_mut(&id).map(|contact| {
            contact.is_bookmarked = !contact.is_bookmarked;
            contact.updated_at = now;
            contact.clone()
        }))
    }

    fn save_contact(
        &self,
        id: Uuid,
        patch: &ContactPatch,
        methods: &[NewMethod],
    ) -> Result<Option<Contact>, StoreError> {
        let mut state = self.lock()?;
        if !state.contacts.contains_key(&id) {
            return Ok(None);
        }
        if let Some(name) = &patch.name {
            check_text("contacts.name", name)?;
        }
        let replacement = build_methods(id, methods)?;
        let now = state.tick();
        Ok(state.contacts.get_mut(&id).map(|contact| {
            if let Some(name) = &patch.name {
                contact.name = name.clone();
            }
            if let Some(flag) = patch.is_bookmarked {
                contact.is_bookmarked = flag;
            }
            contact.methods = replacement;
            contact.updated_at = now;
            contact.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::types::MethodType;

    fn candidate(name: &str, methods: Vec<NewMethod>) -> NewContact {
        NewContact {
            name: name.to_string(),
            is_bookmarked: false,
            methods,
        }
    }

    #[test]
    fn test_failed_batch_leaves_store_untouched() {
        let repo = MemoryContactRepository::new();
        let batch = vec![
            candidate("Ann", vec![NewMethod::unlabeled(MethodType::Phone, "555-1")]),
            candidate(&"x".repeat(MAX_TEXT_LEN + 1), vec![]),
        ];

        let err = repo.insert_batch(&batch).unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(repo.list(false).unwrap().is_empty());
    }

    #[test]
    fn test_delete_cascades_methods() {
        let repo = MemoryContactRepository::new();
        let ids = repo
            .insert_batch(&[candidate(
                "Ann",
                vec![
                    NewMethod::unlabeled(MethodType::Phone, "555-1"),
                    NewMethod::unlabeled(MethodType::Email, "ann@example.com"),
                ],
            )])
            .unwrap();

        assert_eq!(repo.method_count_for(ids[0]), 2);
        assert!(repo.delete(ids[0]).unwrap());
        assert_eq!(repo.method_count_for(ids[0]), 0);
        assert!(!repo.delete(ids[0]).unwrap());
    }

    #[test]
    fn test_replace_rejects_blank_value_without_touching_old_set() {
        let repo = MemoryContactRepository::new();
        let ids = repo
            .insert_batch(&[candidate("Ann", vec![NewMethod::unlabeled(MethodType::Phone, "555-1")])])
            .unwrap();

        let err = repo
            .replace_methods(ids[0], &[NewMethod::unlabeled(MethodType::Email, "  ")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        let stored = repo.get(ids[0]).unwrap().unwrap();
        assert_eq!(stored.methods.len(), 1);
        assert_eq!(stored.methods[0].value, "555-1");
    }

    #[test]
    fn test_save_contact_failure_keeps_name_and_methods() {
        let repo = MemoryContactRepository::new();
        let ids = repo
            .insert_batch(&[candidate("Ann", vec![NewMethod::unlabeled(MethodType::Phone, "555-1")])])
            .unwrap();
        let patch = ContactPatch {
            name: Some("Renamed".to_string()),
            is_bookmarked: Some(true),
        };

        let err = repo
            .save_contact(
                ids[0],
                &patch,
                &[NewMethod::unlabeled(MethodType::Email, "x".repeat(MAX_TEXT_LEN + 1))],
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        let stored = repo.get(ids[0]).unwrap().unwrap();
        assert_eq!(stored.name, "Ann");
        assert!(!stored.is_bookmarked);
        assert_eq!(stored.methods[0].value, "555-1");

        let saved = repo
            .save_contact(ids[0], &patch, &[NewMethod::unlabeled(MethodType::Email, "a@b.com")])
            .unwrap()
            .unwrap();
        assert_eq!(saved.name, "Renamed");
        assert!(saved.is_bookmarked);
        assert_eq!(saved.methods.len(), 1);
        assert_eq!(saved.methods[0].method_type, MethodType::Email);
    }

    #[test]
    fn test_tick_is_strictly_increasing() {
        let mut state = MemoryState::default();
        let first = state.tick();
        let second = state.tick();
        assert!(second > first);
    }
}
