use log::info;
use uuid::Uuid;

use super::error::ContactsError;
use super::service::ContactsService;
use super::types::{Contact, MethodInput, MethodType, NewMethod};

/// Trims values and labels, drops entries whose value is blank and resolves
/// the type of the rest. An unknown type fails the whole set.
pub fn normalize_methods(inputs: &[MethodInput]) -> Result<Vec<NewMethod>, ContactsError> {
    inputs
        .iter()
        .filter_map(|input| {
            let value = input.value.as_deref().unwrap_or_default().trim();
            if value.is_empty() {
                return None;
            }
            Some(input.method_type.parse::<MethodType>().map(|method_type| NewMethod {
                method_type,
                value: value.to_string(),
                label: input
                    .label
                    .as_deref()
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .map(str::to_string),
            }))
        })
        .collect()
}

impl ContactsService {
    /// Replaces every method of `contact_id` with `methods` in one
    /// transaction and returns the contact as stored afterwards.
    pub async fn replace_methods(
        &self,
        contact_id: Uuid,
        methods: &[MethodInput],
    ) -> Result<Contact, ContactsError> {
        let replacement = normalize_methods(methods)?;
        let count = replacement.len();

        let contact = self
            .run(move |repo| repo.replace_methods(contact_id, &replacement))
            .await?
            .ok_or(ContactsError::NotFound)?;

        info!("Replaced methods of contact {contact_id} with {count} entries");
        Ok(contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::memory::MemoryContactRepository;
    use crate::contacts::types::CreateContactRequest;
    use std::sync::Arc;

    async fn seeded() -> (ContactsService, Contact) {
        let service = ContactsService::new(Arc::new(MemoryContactRepository::new()));
        let contact = service
            .create_contact(CreateContactRequest {
                name: "Ann".to_string(),
                is_bookmarked: false,
                methods: vec![
                    MethodInput::new("phone", "555-1"),
                    MethodInput::new("address", "1 Main St"),
                ],
            })
            .await
            .unwrap();
        (service, contact)
    }

    #[test]
    fn test_normalize_drops_blank_values_before_type_check() {
        let inputs = vec![
            MethodInput::new("phone", " 555-1 "),
            MethodInput::new("", "   "),
            MethodInput {
                method_type: "EMAIL".to_string(),
                value: None,
                label: None,
            },
            MethodInput::new("Email", "a@b.com").with_label(""),
        ];

        let methods = normalize_methods(&inputs).unwrap();
        assert_eq!(
            methods,
            vec![
                NewMethod::unlabeled(MethodType::Phone, "555-1"),
                NewMethod::unlabeled(MethodType::Email, "a@b.com"),
            ]
        );
    }

    #[test]
    fn test_normalize_rejects_unknown_type() {
        let err = normalize_methods(&[MethodInput::new("telegraph", "stop")]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown contact method type 'telegraph'.");
    }

    #[tokio::test]
    async fn test_replace_stores_trimmed_value() {
        let (service, contact) = seeded().await;

        let updated = service
            .replace_methods(contact.id, &[MethodInput::new("email", " a@b.com ")])
            .await
            .unwrap();

        assert_eq!(updated.methods.len(), 1);
        assert_eq!(updated.methods[0].method_type, MethodType::Email);
        assert_eq!(updated.methods[0].value, "a@b.com");
    }

    #[tokio::test]
    async fn test_replace_leaves_no_old_entries() {
        let (service, contact) = seeded().await;
        let old_ids: Vec<Uuid> = contact.methods.iter().map(|m| m.id).collect();

        service
            .replace_methods(
                contact.id,
                &[
                    MethodInput::new("social", "@ann"),
                    MethodInput::new("phone", ""),
                    MethodInput::new("phone", "555-9"),
                ],
            )
            .await
            .unwrap();

        let reread = service.get_contact(contact.id).await.unwrap();
        let pairs: Vec<(MethodType, &str)> = reread
            .methods
            .iter()
            .map(|m| (m.method_type, m.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![(MethodType::Social, "@ann"), (MethodType::Phone, "555-9")]);
        assert!(reread.methods.iter().all(|m| !old_ids.contains(&m.id)));
        assert!(reread.methods.iter().all(|m| m.contact_id == contact.id));
    }

    #[tokio::test]
    async fn test_replace_with_empty_set_clears_methods() {
        let (service, contact) = seeded().await;
        let updated = service.replace_methods(contact.id, &[]).await.unwrap();
        assert!(updated.methods.is_empty());
    }

    #[tokio::test]
    async fn test_replace_unknown_contact_is_not_found() {
        let (service, _) = seeded().await;
        let err = service
            .replace_methods(Uuid::new_v4(), &[MethodInput::new("phone", "555-1")])
            .await
            .unwrap_err();
        assert!(matches!(err, ContactsError::NotFound));
    }

    #[tokio::test]
    async fn test_replace_with_bad_type_keeps_previous_set() {
        let (service, contact) = seeded().await;
        let err = service
            .replace_methods(
                contact.id,
                &[MethodInput::new("email", "a@b.com"), MethodInput::new("carrier-pigeon", "coop 4")],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ContactsError::Validation(_)));

        let reread = service.get_contact(contact.id).await.unwrap();
        assert_eq!(reread.methods, contact.methods);
    }
}
