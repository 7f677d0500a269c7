use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::error::ContactsError;

/// Kind of a contact method. The set is closed: anything else is rejected
/// before it reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodType {
    Phone,
    Email,
    Social,
    Address,
}

impl MethodType {
    pub const ALL: [MethodType; 4] = [Self::Phone, Self::Email, Self::Social, Self::Address];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Social => "social",
            Self::Address => "address",
        }
    }
}

impl std::fmt::Display for MethodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodType {
    type Err = ContactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ContactsError::Validation(format!("Unknown contact method type '{wanted}'.")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMethod {
    pub id: Uuid,
    pub contact_id: Uuid,
    #[serde(rename = "type")]
    pub method_type: MethodType,
    pub value: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub is_bookmarked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub methods: Vec<ContactMethod>,
}

impl Contact {
    pub fn methods_of(&self, method_type: MethodType) -> impl Iterator<Item = &ContactMethod> {
        self.methods.iter().filter(move |m| m.method_type == method_type)
    }
}

/// A method that has passed normalization and may be written as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMethod {
    pub method_type: MethodType,
    pub value: String,
    pub label: Option<String>,
}

impl NewMethod {
    pub fn unlabeled(method_type: MethodType, value: impl Into<String>) -> Self {
        Self {
            method_type,
            value: value.into(),
            label: None,
        }
    }
}

/// Candidate contact: produced by single create, the draft editor and the
/// import pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub is_bookmarked: bool,
    pub methods: Vec<NewMethod>,
}

/// Fields of a partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub is_bookmarked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInput {
    #[serde(rename = "type", default)]
    pub method_type: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl MethodInput {
    pub fn new(method_type: &str, value: &str) -> Self {
        Self {
            method_type: method_type.to_string(),
            value: Some(value.to_string()),
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub methods: Vec<MethodInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub is_bookmarked: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaceMethodsRequest {
    #[serde(default)]
    pub methods: Vec<MethodInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkImportRequest {
    #[serde(default = "empty_rows")]
    pub contacts: serde_json::Value,
}

fn empty_rows() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactListQuery {
    pub bookmarked: Option<String>,
    pub sort: Option<String>,
}

impl ContactListQuery {
    pub fn bookmarked_only(&self) -> bool {
        matches!(self.bookmarked.as_deref().map(str::trim), Some("1") | Some("true"))
    }

    /// `sort=name` asks for the display order instead of the store order.
    pub fn sort_by_name(&self) -> bool {
        self.sort.as_deref().map(str::trim) == Some("name")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportFileQuery {
    #[serde(default)]
    pub filename: String,
}

/// Presentation order: bookmarked first, then by name ignoring case.
pub fn sort_for_display(contacts: &mut [Contact]) {
    contacts.sort_by(|a, b| {
        b.is_bookmarked
            .cmp(&a.is_bookmarked)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}
