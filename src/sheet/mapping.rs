//! Conversion between stored contacts and flat template rows.
//!
//! Export writes one row per contact with each method type packed into its
//! own `;`-separated column. Labels have no column, so a round trip keeps
//! name, bookmark and the (type, value) pairs but not labels.

use crate::contacts::{Contact, NewContact, NewMethod};

use super::types::{SheetRow, BOOKMARKED_COLUMN, METHOD_COLUMNS, MULTI_VALUE_SEPARATOR, NAME_COLUMN};

pub fn contact_to_row(contact: &Contact) -> SheetRow {
    let mut row = SheetRow::new()
        .with(NAME_COLUMN, contact.name.as_str())
        .with(BOOKMARKED_COLUMN, if contact.is_bookmarked { "1" } else { "0" });

    for (column, method_type) in METHOD_COLUMNS {
        let joined = contact
            .methods_of(method_type)
            .map(|m| m.value.as_str())
            .collect::<Vec<_>>()
            .join(&MULTI_VALUE_SEPARATOR.to_string());
        row.push(column, joined);
    }
    row
}

pub fn contacts_to_rows(contacts: &[Contact]) -> Vec<SheetRow> {
    contacts.iter().map(contact_to_row).collect()
}

pub fn parse_bookmarked(cell: Option<&str>) -> bool {
    let flag = cell.unwrap_or_default().trim();
    flag.eq_ignore_ascii_case("true") || flag == "1"
}

/// Pieces of a multi-value cell, trimmed, blanks removed.
pub fn split_multi_value(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(MULTI_VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
}

/// Candidate for one row, or `None` when the row has no usable name.
pub fn row_to_candidate(row: &SheetRow) -> Option<NewContact> {
    let name = row.get(NAME_COLUMN).unwrap_or_default().trim();
    if name.is_empty() {
        return None;
    }

    let is_bookmarked = parse_bookmarked(row.get(BOOKMARKED_COLUMN));

    let methods = METHOD_COLUMNS
        .iter()
        .flat_map(|(column, method_type)| {
            split_multi_value(row.get(column).unwrap_or_default())
                .map(move |value| NewMethod::unlabeled(*method_type, value))
        })
        .collect();

    Some(NewContact {
        name: name.to_string(),
        is_bookmarked,
        methods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{ContactMethod, MethodType};
    use chrono::Utc;
    use uuid::Uuid;

    fn method(contact_id: Uuid, method_type: MethodType, value: &str, label: Option<&str>) -> ContactMethod {
        ContactMethod {
            id: Uuid::new_v4(),
            contact_id,
            method_type,
            value: value.to_string(),
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn test_contact_to_row_groups_by_type_in_order() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let contact = Contact {
            id,
            name: "Ann".to_string(),
            is_bookmarked: true,
            created_at: now,
            updated_at: now,
            methods: vec![
                method(id, MethodType::Phone, "555-2", Some("home")),
                method(id, MethodType::Email, "ann@example.com", None),
                method(id, MethodType::Phone, "555-1", None),
            ],
        };

        let row = contact_to_row(&contact);
        assert_eq!(row.get("Name"), Some("Ann"));
        assert_eq!(row.get("Bookmarked"), Some("1"));
        assert_eq!(row.get("Phones"), Some("555-2;555-1"));
        assert_eq!(row.get("Emails"), Some("ann@example.com"));
        assert_eq!(row.get("Socials"), Some(""));
        assert_eq!(row.get("Addresses"), Some(""));
    }

    #[test]
    fn test_bookmarked_accepts_true_and_one_only() {
        assert!(parse_bookmarked(Some("1")));
        assert!(parse_bookmarked(Some(" TRUE ")));
        assert!(!parse_bookmarked(Some("yes")));
        assert!(!parse_bookmarked(Some("0")));
        assert!(!parse_bookmarked(Some("")));
        assert!(!parse_bookmarked(None));
    }

    #[test]
    fn test_row_to_candidate_splits_columns() {
        let row = SheetRow::new()
            .with("name", "  Ann ")
            .with("BOOKMARKED", "1")
            .with("Phones", "555-1; 555-2 ;;")
            .with("addresses", " 1 Main St ");

        let candidate = row_to_candidate(&row).unwrap();
        assert_eq!(candidate.name, "Ann");
        assert!(candidate.is_bookmarked);
        assert_eq!(
            candidate.methods,
            vec![
                NewMethod::unlabeled(MethodType::Phone, "555-1"),
                NewMethod::unlabeled(MethodType::Phone, "555-2"),
                NewMethod::unlabeled(MethodType::Address, "1 Main St"),
            ]
        );
    }

    #[test]
    fn test_row_without_name_is_skipped() {
        assert!(row_to_candidate(&SheetRow::new().with("Name", "   ").with("Phones", "x")).is_none());
        assert!(row_to_candidate(&SheetRow::new().with("Phones", "x")).is_none());
    }
}
