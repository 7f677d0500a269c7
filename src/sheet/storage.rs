use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::warn;
use std::io::Cursor;

use super::types::{SheetError, SheetRow, MAX_IMPORT_BYTES, MAX_IMPORT_ROWS, NAME_COLUMN};

fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => format!("{:?}", e),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

fn unreadable(err: impl std::fmt::Display) -> SheetError {
    warn!("Spreadsheet could not be decoded: {err}");
    SheetError::Unreadable(err.to_string())
}

/// Reads the first worksheet of an uploaded workbook into template rows.
///
/// The first row is the header. Rows whose cells are all empty are skipped
/// and not counted. Checks run in a fixed order and the first failure is
/// returned: size, extension, sheet presence, row ceiling, row floor, and
/// finally the `Name` header.
pub fn parse_workbook(filename: &str, bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    if bytes.len() > MAX_IMPORT_BYTES {
        return Err(SheetError::TooLarge);
    }

    let ext = file_extension(filename);
    if ext != "xlsx" && ext != "xls" {
        return Err(SheetError::InvalidFileType);
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(unreadable)?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SheetError::NoSheet)?;
    let range = workbook.worksheet_range(&first_sheet).map_err(unreadable)?;

    let mut lines = range
        .rows()
        .map(|cells| cells.iter().map(cell_text).collect::<Vec<String>>());
    let header = lines.next().unwrap_or_default();
    let data: Vec<Vec<String>> = lines
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();

    if data.len() > MAX_IMPORT_ROWS {
        return Err(SheetError::TooManyRows(data.len()));
    }
    if data.is_empty() {
        return Err(SheetError::Empty);
    }
    if !header.iter().any(|h| h.trim().eq_ignore_ascii_case(NAME_COLUMN)) {
        return Err(SheetError::MissingNameColumn);
    }

    Ok(data
        .into_iter()
        .map(|cells| {
            let mut row = SheetRow::new();
            for (column, value) in header.iter().zip(cells) {
                if !column.is_empty() {
                    row.push(column, value);
                }
            }
            row
        })
        .collect())
}
