//! Excel report exporter - comparison report → .xlsx

use crate::error::{FcaError, FcaResult};
use crate::writer::ComparisonReport;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

/// Writes a comparison report as a workbook with one sheet per table.
pub struct ReportExporter<'a> {
    report: &'a ComparisonReport,
}

impl<'a> ReportExporter<'a> {
    pub fn new(report: &'a ComparisonReport) -> Self {
        Self { report }
    }

    pub fn export(&self, output: &Path) -> FcaResult<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name("H2 Abweichungen").map_err(to_export)?;
        self.write_h2(sheet, &header)?;

        let sheet = workbook.add_worksheet();
        sheet.set_name("H1 Abweichungen").map_err(to_export)?;
        self.write_h1(sheet, &header)?;

        if !self.report.annotations.is_empty() {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Kommentare").map_err(to_export)?;
            sheet.write_string_with_format(0, 0, "Kommentar", &header).map_err(to_export)?;
            for (i, note) in self.report.annotations.iter().enumerate() {
                sheet.write_string(i as u32 + 1, 0, note).map_err(to_export)?;
            }
        }

        workbook.save(output).map_err(to_export)?;
        Ok(())
    }

    fn write_h2(&self, sheet: &mut Worksheet, header: &Format) -> FcaResult<()> {
        let selection = &self.report.selection;
        let headers = [
            "Hauptfunktion".to_string(),
            "Nebenfunktion".to_string(),
            format!("Kosten {}", selection.product_a),
            format!("Kosten {}", selection.product_b),
            "Delta".to_string(),
        ];
        write_headers(sheet, &headers, header)?;

        for (i, row) in self.report.h2.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.h1).map_err(to_export)?;
            sheet.write_string(r, 1, &row.h2).map_err(to_export)?;
            sheet.write_number(r, 2, row.cost_a).map_err(to_export)?;
            sheet.write_number(r, 3, row.cost_b).map_err(to_export)?;
            sheet.write_number(r, 4, row.delta).map_err(to_export)?;
        }
        sheet.set_column_width(0, 24).map_err(to_export)?;
        sheet.set_column_width(1, 24).map_err(to_export)?;
        Ok(())
    }

    fn write_h1(&self, sheet: &mut Worksheet, header: &Format) -> FcaResult<()> {
        let selection = &self.report.selection;
        let headers = [
            "Hauptfunktion".to_string(),
            format!("Kosten {}", selection.product_a),
            format!("Kosten {}", selection.product_b),
            "Delta".to_string(),
        ];
        write_headers(sheet, &headers, header)?;

        for (i, row) in self.report.h1.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, &row.h1).map_err(to_export)?;
            sheet.write_number(r, 1, row.cost_a).map_err(to_export)?;
            sheet.write_number(r, 2, row.cost_b).map_err(to_export)?;
            sheet.write_number(r, 3, row.delta).map_err(to_export)?;
        }
        sheet.set_column_width(0, 24).map_err(to_export)?;
        Ok(())
    }
}

fn write_headers(sheet: &mut Worksheet, headers: &[String], format: &Format) -> FcaResult<()> {
    for (col, title) in headers.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, title, format)
            .map_err(to_export)?;
    }
    Ok(())
}

fn to_export(e: rust_xlsxwriter::XlsxError) -> FcaError {
    FcaError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Selection;
    use crate::types::H1Comparison;
    use calamine::{open_workbook, Reader, Xlsx};
    use tempfile::TempDir;

    #[test]
    fn test_export_creates_sheets() {
        let report = ComparisonReport::new(
            Selection {
                product_a: "A".to_string(),
                product_b: "B".to_string(),
                top_n: 5,
            },
            Vec::new(),
            vec![H1Comparison {
                h1: "Komfort".to_string(),
                cost_a: 10.0,
                cost_b: 15.0,
                delta: 5.0,
            }],
            vec!["geprüft".to_string()],
        );
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        ReportExporter::new(&report).export(&path).unwrap();

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["H2 Abweichungen", "H1 Abweichungen", "Kommentare"]
        );
    }
}
