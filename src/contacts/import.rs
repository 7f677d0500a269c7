use log::{error, info};
use serde_json::{Map, Value};

use super::error::ContactsError;
use super::methods::normalize_methods;
use super::service::ContactsService;
use super::types::{ImportSummary, MethodInput, NewContact};
use crate::sheet::{parse_workbook, row_to_candidate, SheetRow};

/// Turns template rows into candidates, silently dropping rows without a
/// name. A batch that ends up empty is refused rather than reported as a
/// successful import of nothing.
pub fn candidates_from_rows(rows: &[SheetRow]) -> Result<Vec<NewContact>, ContactsError> {
    let candidates: Vec<NewContact> = rows.iter().filter_map(row_to_candidate).collect();
    non_empty(candidates)
}

/// Candidates from an untrusted JSON payload, which has to be an array.
///
/// Each element is either an already mapped contact
/// (`{name, isBookmarked, methods: [{type, value, label}]}`) or a row keyed by
/// template columns. Elements that are not objects count as rows without a
/// name. An unknown method type in a mapped contact fails the whole batch.
pub fn candidates_from_json(payload: &Value) -> Result<Vec<NewContact>, ContactsError> {
    let elements = payload
        .as_array()
        .ok_or_else(|| ContactsError::Structural("contacts must be an array".to_string()))?;

    let mut candidates = Vec::with_capacity(elements.len());
    for element in elements {
        let Some(object) = element.as_object() else {
            continue;
        };
        let candidate = if is_mapped_contact(object) {
            mapped_candidate(object)?
        } else {
            SheetRow::from_json(element).as_ref().and_then(row_to_candidate)
        };
        candidates.extend(candidate);
    }
    non_empty(candidates)
}

fn non_empty(candidates: Vec<NewContact>) -> Result<Vec<NewContact>, ContactsError> {
    if candidates.is_empty() {
        return Err(ContactsError::Structural("No valid rows found in Excel.".to_string()));
    }
    Ok(candidates)
}

fn is_mapped_contact(object: &Map<String, Value>) -> bool {
    object.get("isBookmarked").is_some_and(Value::is_boolean)
        || object.get("methods").is_some_and(Value::is_array)
}

fn mapped_candidate(object: &Map<String, Value>) -> Result<Option<NewContact>, ContactsError> {
    let name = object.get("name").and_then(Value::as_str).unwrap_or_default().trim();
    if name.is_empty() {
        return Ok(None);
    }

    let inputs: Vec<MethodInput> = match object.get("methods") {
        Some(methods @ Value::Array(_)) => serde_json::from_value(methods.clone()).map_err(|e| {
            ContactsError::Structural(format!("Invalid methods for contact '{name}': {e}"))
        })?,
        _ => Vec::new(),
    };

    Ok(Some(NewContact {
        name: name.to_string(),
        is_bookmarked: object.get("isBookmarked").and_then(Value::as_bool).unwrap_or(false),
        methods: normalize_methods(&inputs)?,
    }))
}

impl ContactsService {
    /// Creates every candidate in one transaction; either all of them are
    /// committed or none is.
    async fn commit_batch(&self, candidates: Vec<NewContact>) -> Result<ImportSummary, ContactsError> {
        let submitted = candidates.len();
        let ids = self.run(move |repo| repo.insert_batch(&candidates)).await?;

        info!("Imported {} of {} submitted contacts", ids.len(), submitted);
        Ok(ImportSummary {
            created_count: ids.len(),
        })
    }

    pub async fn bulk_import(&self, payload: &Value) -> Result<ImportSummary, ContactsError> {
        let candidates = candidates_from_json(payload)?;
        self.commit_batch(candidates).await
    }

    pub async fn import_rows(&self, rows: &[SheetRow]) -> Result<ImportSummary, ContactsError> {
        let candidates = candidates_from_rows(rows)?;
        self.commit_batch(candidates).await
    }

    /// Full upload path: validate and decode the workbook, map its rows,
    /// then commit them as one batch.
    pub async fn import_artifact(&self, filename: String, bytes: Vec<u8>) -> Result<ImportSummary, ContactsError> {
        let rows = tokio::task::spawn_blocking(move || parse_workbook(&filename, &bytes))
            .await
            .map_err(|e| {
                error!("Spreadsheet parsing task failed: {e}");
                ContactsError::System("Import failed.".to_string())
            })??;

        self.import_rows(&rows).await
    }
}
