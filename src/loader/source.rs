//! Reading raw rows from CSV files and spreadsheet workbooks.

use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tracing::debug;

use super::coerce::Cell;
use super::LoadError;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// Detect the format from the file extension.
    pub fn detect(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Header and data rows of one sheet, before any typing.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    /// Sheet name, `None` for CSV.
    pub sheet: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Read a source file into a [`RawSheet`].
pub fn read_source(path: &Path, sheet: Option<&str>) -> Result<RawSheet, LoadError> {
    match SourceFormat::detect(path)? {
        SourceFormat::Csv => read_csv(path),
        SourceFormat::Workbook => read_workbook(path, sheet),
    }
}

fn read_csv(path: &Path) -> Result<RawSheet, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptySource {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    debug!("Read {} CSV rows from {}", rows.len(), path.display());

    Ok(RawSheet {
        sheet: None,
        headers,
        rows,
    })
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawSheet, LoadError> {
    let workbook_err = |source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let sheet_names = workbook.sheet_names();

    let name = match sheet {
        Some(wanted) => {
            if !sheet_names.iter().any(|n| n == wanted) {
                return Err(LoadError::SheetNotFound {
                    sheet: wanted.to_string(),
                    available: sheet_names.join(", "),
                });
            }
            wanted.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::EmptySource {
                path: path.to_path_buf(),
            })?,
    };

    let range = workbook.worksheet_range(&name).map_err(workbook_err)?;
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| LoadError::EmptySource {
            path: path.to_path_buf(),
        })?
        .iter()
        .map(|data| cell_from_data(data).to_string())
        .collect();

    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(cell_from_data).collect()).collect();

    debug!(
        "Read {} rows from sheet '{}' of {}",
        rows.len(),
        name,
        path.display()
    );

    Ok(RawSheet {
        sheet: Some(name),
        headers,
        rows,
    })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::from_text(s),
        other => Cell::from_text(&other.to_string()),
    }
}
