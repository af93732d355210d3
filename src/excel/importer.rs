//! Workbook access - Excel (.xlsx/.xlsm/.xls/.ods) → cell grids

use crate::core::cell::{CellValue, Grid};
use crate::error::{FcaError, FcaResult};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Anything that can hand out sheets as untyped grids.
pub trait WorkbookSource {
    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read one sheet. Unknown sheets are an error.
    fn grid(&mut self, sheet: &str) -> FcaResult<Grid>;

    /// Display name of the workbook, used in messages.
    fn display_name(&self) -> String;
}

/// A workbook on disk, read through calamine.
pub struct ExcelWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl ExcelWorkbook {
    /// Open a workbook; the format is chosen by file extension.
    pub fn open<P: AsRef<Path>>(path: P) -> FcaResult<Self> {
        let path = path.as_ref().to_path_buf();
        let sheets = open_workbook_auto(&path).map_err(|e| FcaError::Workbook {
            file: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { path, sheets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkbookSource for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn grid(&mut self, sheet: &str) -> FcaResult<Grid> {
        let range = self
            .sheets
            .worksheet_range(sheet)
            .map_err(|e| FcaError::Workbook {
                file: self.path.clone(),
                reason: format!("sheet '{}': {}", sheet, e),
            })?;
        Ok(range_to_grid(&range))
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Grids held in memory, for callers that already have the cells.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    name: String,
    sheets: Vec<(String, Grid)>,
}

impl MemoryWorkbook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheets: Vec::new(),
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>, grid: Grid) -> Self {
        self.sheets.push((sheet.into(), grid));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn grid(&mut self, sheet: &str) -> FcaResult<Grid> {
        self.sheets
            .iter()
            .find(|(n, _)| n == sheet)
            .map(|(_, g)| g.clone())
            .ok_or_else(|| FcaError::MissingSheet {
                file: self.name.clone(),
                sheet: format!("'{}'", sheet),
            })
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}

/// Copy a calamine range into a grid at absolute sheet coordinates.
///
/// calamine trims leading empty rows and columns; the range start restores
/// them so fixed row/column offsets stay valid.
pub fn range_to_grid(range: &Range<Data>) -> Grid {
    let mut grid = Grid::new();
    let (row0, col0) = match range.start() {
        Some((r, c)) => (r as usize, c as usize),
        None => return grid,
    };
    for (i, row) in range.rows().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            let value = convert_cell(cell);
            if value != CellValue::Empty {
                grid.set(row0 + i, col0 + j, value);
            }
        }
    }
    grid
}

/// Map a calamine cell onto the untyped cell model.
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        _ => CellValue::Empty,
    }
}

/// Product name derived from a file name: extension dropped, anything
/// other than letters, digits, `-` and `_` collapsed into `_`.
pub fn sanitize_product_name(path: &Path) -> String {
    let raw = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        raw
    } else {
        trimmed.to_string()
    }
}
