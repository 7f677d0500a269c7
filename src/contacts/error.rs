use axum::extract::rejection::{BytesRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::error;

use super::repository::StoreError;
use crate::sheet::SheetError;

#[derive(Debug, thiserror::Error)]
pub enum ContactsError {
    #[error("{0}")]
    Validation(String),
    #[error("Contact not found")]
    NotFound,
    #[error("{0}")]
    Structural(String),
    #[error("{0}")]
    ResourceLimit(String),
    #[error("{0}")]
    System(String),
}

impl ContactsError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Structural(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ResourceLimit(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::System(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ContactsError {
    fn from(err: StoreError) -> Self {
        error!("Contact store operation failed: {err}");
        Self::System("The contact store could not complete the operation.".to_string())
    }
}

impl From<SheetError> for ContactsError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::TooLarge | SheetError::TooManyRows(_) => Self::ResourceLimit(err.to_string()),
            SheetError::Write(_) => {
                error!("Spreadsheet export failed: {err}");
                Self::System("Export failed.".to_string())
            }
            _ => Self::Structural(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ContactsError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ContactsError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(format!("Invalid contact id: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ContactsError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<BytesRejection> for ContactsError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return SheetError::TooLarge.into();
        }
        Self::Validation(format!("Invalid upload: {}", rejection.body_text()))
    }
}

impl IntoResponse for ContactsError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "message": self.to_string() }))).into_response()
    }
}
