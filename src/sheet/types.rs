use serde_json::Value;

use crate::contacts::MethodType;

pub const NAME_COLUMN: &str = "Name";
pub const BOOKMARKED_COLUMN: &str = "Bookmarked";

/// Multi-value columns and the method type each one carries.
pub const METHOD_COLUMNS: [(&str, MethodType); 4] = [
    ("Phones", MethodType::Phone),
    ("Emails", MethodType::Email),
    ("Socials", MethodType::Social),
    ("Addresses", MethodType::Address),
];

/// Column order of the import/export template.
pub const COLUMNS: [&str; 6] = [
    NAME_COLUMN,
    BOOKMARKED_COLUMN,
    "Phones",
    "Emails",
    "Socials",
    "Addresses",
];

/// Separator inside multi-value cells.
pub const MULTI_VALUE_SEPARATOR: char = ';';

pub const MAX_IMPORT_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_IMPORT_ROWS: usize = 2000;

pub const EXPORT_SHEET_NAME: &str = "Contacts";
pub const EXPORT_FILENAME: &str = "address_book.xlsx";
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    #[error("File too large. Please upload <= 2MB Excel.")]
    TooLarge,
    #[error("Invalid file type. Please upload an .xlsx/.xls file.")]
    InvalidFileType,
    #[error("No sheet found in the Excel file.")]
    NoSheet,
    #[error("Too many rows ({0}). Please limit to <= 2000.")]
    TooManyRows(usize),
    #[error("Excel is empty.")]
    Empty,
    #[error("Invalid template. Missing 'Name' column. Expected: Name, Bookmarked, Phones, Emails, Socials, Addresses.")]
    MissingNameColumn,
    #[error("Import failed. Please check the Excel format.")]
    Unreadable(String),
    #[error("Export failed: {0}")]
    Write(String),
}

/// One spreadsheet row keyed by header text. Lookups ignore ASCII case and
/// surrounding whitespace in the header; the first matching column wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    cells: Vec<(String, String)>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: &str, value: impl Into<String>) {
        self.cells.push((column.to_string(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(column))
            .map(|(_, value)| value.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    /// Builds a row from a JSON object; anything else is not a row.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut row = Self::new();
        for (key, cell) in object {
            row.push(key, json_cell_text(cell));
        }
        Some(row)
    }
}

fn json_cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
