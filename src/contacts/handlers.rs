use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::header,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::error::ContactsError;
use super::types::*;
use crate::shared::state::AppState;
use crate::sheet::{EXPORT_FILENAME, XLSX_CONTENT_TYPE};

// Extractor failures are taken as `Result` so they reach the client as a
// `ContactsError` body instead of axum's plain-text rejection.

/// Transport ceiling for the upload route. Kept above the workbook limit so an
/// oversized file gets the import error rather than a bare 413.
const IMPORT_BODY_LIMIT: usize = 5 * 1024 * 1024;

pub fn configure_contacts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts_handler).post(create_contact_handler))
        .route("/contacts/bulk", post(bulk_import_handler))
        .route(
            "/contacts/import",
            post(import_file_handler).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
        .route("/contacts/export", get(export_contacts_handler))
        .route(
            "/contacts/{id}",
            get(get_contact_handler)
                .put(update_contact_handler)
                .delete(delete_contact_handler),
        )
        .route("/contacts/{id}/bookmark", patch(toggle_bookmark_handler))
        .route("/contacts/{id}/methods", put(replace_methods_handler))
}

pub async fn list_contacts_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContactListQuery>, QueryRejection>,
) -> Result<Json<Vec<Contact>>, ContactsError> {
    let Query(query) = query?;
    let mut contacts = state.contacts().list_contacts(query.bookmarked_only()).await?;
    if query.sort_by_name() {
        sort_for_display(&mut contacts);
    }
    Ok(Json(contacts))
}

pub async fn create_contact_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<CreateContactRequest>, JsonRejection>,
) -> Result<Json<Contact>, ContactsError> {
    let Json(request) = request?;
    let contact = state.contacts().create_contact(request).await?;
    Ok(Json(contact))
}

pub async fn get_contact_handler(
    State(state): State<Arc<AppState>>,
    contact_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Contact>, ContactsError> {
    let Path(contact_id) = contact_id?;
    let contact = state.contacts().get_contact(contact_id).await?;
    Ok(Json(contact))
}

pub async fn update_contact_handler(
    State(state): State<Arc<AppState>>,
    contact_id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<UpdateContactRequest>, JsonRejection>,
) -> Result<Json<Contact>, ContactsError> {
    let Path(contact_id) = contact_id?;
    let Json(request) = request?;
    let contact = state.contacts().update_contact(contact_id, request).await?;
    Ok(Json(contact))
}

pub async fn delete_contact_handler(
    State(state): State<Arc<AppState>>,
    contact_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<serde_json::Value>, ContactsError> {
    let Path(contact_id) = contact_id?;
    state.contacts().delete_contact(contact_id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn toggle_bookmark_handler(
    State(state): State<Arc<AppState>>,
    contact_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Contact>, ContactsError> {
    let Path(contact_id) = contact_id?;
    let contact = state.contacts().toggle_bookmark(contact_id).await?;
    Ok(Json(contact))
}

pub async fn replace_methods_handler(
    State(state): State<Arc<AppState>>,
    contact_id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<ReplaceMethodsRequest>, JsonRejection>,
) -> Result<Json<Contact>, ContactsError> {
    let Path(contact_id) = contact_id?;
    let Json(request) = request?;
    let contact = state
        .contacts()
        .replace_methods(contact_id, &request.methods)
        .await?;
    Ok(Json(contact))
}

pub async fn bulk_import_handler(
    State(state): State<Arc<AppState>>,
    request: Result<Json<BulkImportRequest>, JsonRejection>,
) -> Result<Json<ImportSummary>, ContactsError> {
    let Json(request) = request?;
    let summary = state.contacts().bulk_import(&request.contacts).await?;
    Ok(Json(summary))
}

pub async fn import_file_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ImportFileQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ImportSummary>, ContactsError> {
    let Query(query) = query?;
    let body = body?;
    let summary = state
        .contacts()
        .import_artifact(query.filename, body.to_vec())
        .await?;
    Ok(Json(summary))
}

pub async fn export_contacts_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ContactListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ContactsError> {
    let Query(query) = query?;
    let bytes = state.contacts().export_contacts(query.bookmarked_only()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        bytes,
    ))
}
