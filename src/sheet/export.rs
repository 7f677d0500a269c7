use rust_xlsxwriter::{Format, Workbook};

use super::types::{SheetError, SheetRow, BOOKMARKED_COLUMN, COLUMNS, EXPORT_SHEET_NAME};

/// Writes `rows` as a single-sheet workbook using the template columns.
/// `Bookmarked` is written as a number so spreadsheet apps show 1/0.
pub fn export_to_xlsx(rows: &[SheetRow]) -> Result<Vec<u8>, SheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(EXPORT_SHEET_NAME)
        .map_err(|e| SheetError::Write(e.to_string()))?;

    let header_format = Format::new().set_bold();
    for (col, column) in COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *column, &header_format)
            .map_err(|e| SheetError::Write(e.to_string()))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = u32::try_from(index + 1).map_err(|e| SheetError::Write(e.to_string()))?;

        for (col, column) in COLUMNS.iter().enumerate() {
            let value = row.get(column).unwrap_or_default();
            if value.is_empty() {
                continue;
            }

            let col = col as u16;
            match value.parse::<f64>() {
                Ok(flag) if *column == BOOKMARKED_COLUMN => {
                    worksheet
                        .write_number(line, col, flag)
                        .map_err(|e| SheetError::Write(e.to_string()))?;
                }
                _ => {
                    worksheet
                        .write_string(line, col, value)
                        .map_err(|e| SheetError::Write(e.to_string()))?;
                }
            }
        }
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| SheetError::Write(e.to_string()))
}
