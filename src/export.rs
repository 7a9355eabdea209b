//! Spreadsheet and archive builders for the admin export endpoints.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::AppError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Build a single-sheet workbook: a bold header row from `columns`
/// (title plus column width) followed by one row per entry.
pub fn build_workbook(
    sheet_name: &str,
    columns: &[(&str, f64)],
    rows: &[Vec<String>],
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sheet_name)
        .map_err(|e| AppError::Internal(format!("Failed to build workbook: {e}")))?;

    let header_format = Format::new().set_bold();
    for (index, (title, width)) in columns.iter().enumerate() {
        worksheet
            .set_column_width(index as u16, *width)
            .map_err(|e| AppError::Internal(format!("Failed to build workbook: {e}")))?;
        worksheet
            .write_with_format(0, index as u16, *title, &header_format)
            .map_err(|e| AppError::Internal(format!("Failed to build workbook: {e}")))?;
    }

    for (row_index, row) in rows.iter().enumerate() {
        for (col_index, cell) in row.iter().enumerate() {
            worksheet
                .write_string(row_index as u32 + 1, col_index as u16, cell)
                .map_err(|e| AppError::Internal(format!("Failed to build workbook: {e}")))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::Internal(format!("Failed to build workbook: {e}")))
}

/// Bundle named files into a zip archive.
pub fn build_zip(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, bytes) in files {
        zip.start_file(name.as_str(), options)
            .map_err(|e| AppError::Internal(format!("Failed to build archive: {e}")))?;
        zip.write_all(bytes)
            .map_err(|e| AppError::Internal(format!("Failed to build archive: {e}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| AppError::Internal(format!("Failed to build archive: {e}")))?;
    Ok(cursor.into_inner())
}

/// Timestamp rendering used in spreadsheet cells.
pub fn format_cell_datetime(instant: &DateTime<Utc>) -> String {
    instant.format("%d/%m/%Y, %H:%M").to_string()
}

/// Today's date for default export filenames.
pub fn today_label() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Keep filename fragments safe: anything outside `[A-Za-z0-9._-]`
/// becomes an underscore.
pub fn sanitize_filename_part(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
