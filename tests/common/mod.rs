//! Shared fixtures: synthetic cost-structure grids and workbooks on disk.

#![allow(dead_code)]

use fca_toolset::core::{CellValue, Grid};
use rust_xlsxwriter::Workbook;
use std::path::Path;

pub const COST_SHEET: &str = "SLAVE_Funktions-Kostenstruktur";
pub const TECH_SHEET: &str = "SLAVE_Techn.Bewertung";

/// Two H1 blocks in German number format:
/// "Comfort" spans columns 8-10 (Seat, Climate, Light),
/// "Safety" spans columns 11-12 (Brake, Sensor).
pub fn two_block_grid() -> Grid {
    let mut g = Grid::new();
    g.set(0, 0, "Funktionskostenanalyse");
    g.set(0, 8, "Comfort");
    g.set(0, 11, "Safety");

    for (col, label) in [(8, "Seat"), (9, "Climate"), (10, "Light"), (11, "Brake"), (12, "Sensor")] {
        g.set(1, col, label);
    }

    g.set(3, 8, "40");
    g.set(3, 11, "60");
    for (col, w) in [(8, "50"), (9, "30"), (10, "20"), (11, "70"), (12, "30")] {
        g.set(4, col, w);
    }

    g.set(6, 8, "1.234,56");
    g.set(6, 11, "2.000,00");
    for (col, c) in [
        (8, "500,50"),
        (9, "434,06"),
        (10, "300"),
        (11, "1.500,25"),
        (12, "499,75"),
    ] {
        g.set(7, col, c);
    }
    g
}

/// Tech sheet rows below four header rows: label in B, score in R.
pub fn tech_grid(rows: &[(&str, f64)]) -> Grid {
    let mut g = Grid::new();
    g.set(0, 1, "Technische Bewertung");
    g.set(3, 1, "Nebenfunktion");
    g.set(3, 17, "Score");
    for (i, (label, score)) in rows.iter().enumerate() {
        g.set(4 + i, 1, *label);
        g.set(4 + i, 17, *score);
    }
    g
}

/// Write grids to an .xlsx file, one worksheet per (name, grid).
pub fn write_workbook(path: &Path, sheets: &[(&str, &Grid)]) {
    let mut workbook = Workbook::new();
    for (name, grid) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                match grid.get(row, col) {
                    Some(CellValue::Text(s)) => {
                        sheet.write_string(row as u32, col as u16, s).unwrap();
                    }
                    Some(CellValue::Number(n)) => {
                        sheet.write_number(row as u32, col as u16, *n).unwrap();
                    }
                    Some(CellValue::Bool(b)) => {
                        sheet.write_boolean(row as u32, col as u16, *b).unwrap();
                    }
                    _ => {}
                }
            }
        }
    }
    workbook.save(path).unwrap();
}

/// Product workbook with cost and tech sheets.
pub fn write_product(path: &Path, cost: &Grid, tech: Option<&Grid>) {
    match tech {
        Some(t) => write_workbook(path, &[(COST_SHEET, cost), (TECH_SHEET, t)]),
        None => write_workbook(path, &[(COST_SHEET, cost)]),
    }
}
