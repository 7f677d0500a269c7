use uuid::Uuid;

use super::types::{Contact, MethodInput, MethodType};

/// One editable method row. Fields hold raw user text until the draft is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftMethod {
    pub method_type: String,
    pub value: String,
    pub label: String,
}

impl DraftMethod {
    pub fn blank() -> Self {
        Self {
            method_type: MethodType::Phone.to_string(),
            value: String::new(),
            label: String::new(),
        }
    }
}

/// Edit buffer for a single contact.
///
/// It is owned by whoever is editing and is never merged back into stored
/// state: saving goes through `ContactsService::save_draft`, cancelling is
/// simply dropping it. There is always at least one method row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    editing: Option<Uuid>,
    pub name: String,
    pub is_bookmarked: bool,
    methods: Vec<DraftMethod>,
}

impl Default for ContactDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactDraft {
    pub fn new() -> Self {
        Self {
            editing: None,
            name: String::new(),
            is_bookmarked: false,
            methods: vec![DraftMethod::blank()],
        }
    }

    pub fn edit(contact: &Contact) -> Self {
        let mut methods: Vec<DraftMethod> = contact
            .methods
            .iter()
            .map(|m| DraftMethod {
                method_type: m.method_type.to_string(),
                value: m.value.clone(),
                label: m.label.clone().unwrap_or_default(),
            })
            .collect();
        if methods.is_empty() {
            methods.push(DraftMethod::blank());
        }

        Self {
            editing: Some(contact.id),
            name: contact.name.clone(),
            is_bookmarked: contact.is_bookmarked,
            methods,
        }
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn methods(&self) -> &[DraftMethod] {
        &self.methods
    }

    pub fn method_mut(&mut self, index: usize) -> Option<&mut DraftMethod> {
        self.methods.get_mut(index)
    }

    pub fn add_method_row(&mut self) {
        self.methods.push(DraftMethod::blank());
    }

    pub fn remove_method_row(&mut self, index: usize) {
        if index < self.methods.len() {
            self.methods.remove(index);
        }
        if self.methods.is_empty() {
            self.methods.push(DraftMethod::blank());
        }
    }

    pub fn method_inputs(&self) -> Vec<MethodInput> {
        self.methods
            .iter()
            .map(|m| MethodInput {
                method_type: m.method_type.clone(),
                value: Some(m.value.clone()),
                label: Some(m.label.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::types::ContactMethod;
    use chrono::Utc;

    fn stored(methods: Vec<ContactMethod>) -> Contact {
        let now = Utc::now();
        Contact {
            id: Uuid::new_v4(),
            name: "Ann".to_string(),
            is_bookmarked: true,
            created_at: now,
            updated_at: now,
            methods,
        }
    }

    #[test]
    fn test_new_draft_has_one_blank_phone_row() {
        let draft = ContactDraft::new();
        assert_eq!(draft.editing(), None);
        assert_eq!(draft.methods(), &[DraftMethod::blank()]);
        assert_eq!(draft.methods()[0].method_type, "phone");
    }

    #[test]
    fn test_removing_last_row_keeps_a_blank_one() {
        let mut draft = ContactDraft::new();
        draft.method_mut(0).unwrap().value = "555-1".to_string();
        draft.remove_method_row(0);
        assert_eq!(draft.methods(), &[DraftMethod::blank()]);

        draft.remove_method_row(7);
        assert_eq!(draft.methods().len(), 1);
    }

    #[test]
    fn test_edit_copies_stored_methods() {
        let contact_id = Uuid::new_v4();
        let contact = stored(vec![ContactMethod {
            id: Uuid::new_v4(),
            contact_id,
            method_type: MethodType::Email,
            value: "ann@example.com".to_string(),
            label: None,
        }]);

        let mut draft = ContactDraft::edit(&contact);
        assert_eq!(draft.editing(), Some(contact.id));
        assert!(draft.is_bookmarked);
        assert_eq!(draft.methods()[0].label, "");

        draft.method_mut(0).unwrap().value = "changed@example.com".to_string();
        assert_eq!(contact.methods[0].value, "ann@example.com");
    }

    #[test]
    fn test_edit_contact_without_methods_gets_blank_row() {
        let draft = ContactDraft::edit(&stored(vec![]));
        assert_eq!(draft.methods(), &[DraftMethod::blank()]);
    }
}
