//! Excel import/export
//!
//! - Import: workbook sheets (.xlsx/.xlsm/.xls/.ods) → untyped cell grids
//! - Export: comparison report → .xlsx

mod exporter;
mod importer;

pub use exporter::ReportExporter;
pub use importer::{
    range_to_grid, sanitize_product_name, ExcelWorkbook, MemoryWorkbook, WorkbookSource,
};
