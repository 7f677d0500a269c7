//! Spreadsheet side of contact import/export: the flat template row, its
//! mapping to and from contacts, and xlsx reading/writing.

pub mod export;
pub mod mapping;
pub mod storage;
pub mod types;

pub use export::export_to_xlsx;
pub use mapping::{contact_to_row, contacts_to_rows, parse_bookmarked, row_to_candidate, split_multi_value};
pub use storage::parse_workbook;
pub use types::{
    SheetError, SheetRow, COLUMNS, EXPORT_FILENAME, MAX_IMPORT_BYTES, MAX_IMPORT_ROWS, METHOD_COLUMNS,
    XLSX_CONTENT_TYPE,
};
