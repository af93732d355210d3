//! Per-file product loading and the explicit selection state of one session.
//!
//! A failed file never stops the others: fatal per-product conditions become
//! a [`ParseNote`] and the product is left out.

use crate::core::extractor::extract_cost_structure;
use crate::core::reconcile::{compare_h1, compare_h2};
use crate::core::tech::{join_tech, read_tech_scores};
use crate::error::{FcaError, FcaResult};
use crate::excel::{sanitize_product_name, ExcelWorkbook, WorkbookSource};
use crate::layout::{find_sheet, SheetLayout};
use crate::types::{ComparisonRow, H1Comparison, NoteKind, ParseNote, Product};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A parsed product plus the degraded-data notes raised while parsing it.
#[derive(Debug, Clone)]
pub struct ParsedProduct {
    pub product: Product,
    pub notes: Vec<ParseNote>,
}

/// Parse one workbook into a [`Product`].
///
/// Only a missing or unreadable cost-structure sheet is an error. A missing
/// or unreadable tech sheet, or a sheet without H1 labels, yields empty
/// tables and a note.
pub fn parse_product<W: WorkbookSource>(
    name: &str,
    source: PathBuf,
    workbook: &mut W,
    layout: &SheetLayout,
) -> FcaResult<ParsedProduct> {
    let file = workbook.display_name();
    let sheet_names = workbook.sheet_names();
    let mut notes = Vec::new();

    let cost_sheet = find_sheet(&sheet_names, &layout.cost_sheet)
        .ok_or_else(|| FcaError::MissingSheet {
            file: file.clone(),
            sheet: layout.cost_sheet_description(),
        })?
        .to_string();
    let grid = workbook.grid(&cost_sheet)?;
    let structure = extract_cost_structure(&grid, layout);

    if structure.is_empty() {
        notes.push(ParseNote::new(
            &file,
            NoteKind::NoBlocksDetected,
            format!("no main functions found on sheet '{}'", cost_sheet),
        ));
    }
    for label in structure.childless() {
        notes.push(ParseNote::new(
            &file,
            NoteKind::EmptyBlock,
            format!("main function '{}' has no sub-functions", label),
        ));
    }

    let tech_sheet = find_sheet(&sheet_names, &layout.tech_sheet).map(str::to_string);
    let (tech, h2) = match &tech_sheet {
        Some(sheet) => match workbook.grid(sheet) {
            Ok(tech_grid) => {
                let scores = read_tech_scores(&tech_grid, layout);
                let joined = join_tech(&structure.h2, &scores);
                (scores, joined)
            }
            Err(e) => {
                notes.push(ParseNote::new(
                    &file,
                    NoteKind::TechUnreadable,
                    format!("technical evaluation sheet unreadable ({}); tech scores unavailable", e),
                ));
                (Vec::new(), structure.h2)
            }
        },
        None => {
            notes.push(ParseNote::new(
                &file,
                NoteKind::OptionalSheetMissing,
                "no technical evaluation sheet; tech scores unavailable",
            ));
            (Vec::new(), structure.h2)
        }
    };

    for note in &notes {
        warn!(kind = ?note.kind, "{}", note);
    }
    info!(
        product = name,
        h1 = structure.h1.len(),
        h2 = h2.len(),
        tech = tech.len(),
        "parsed product"
    );

    Ok(ParsedProduct {
        product: Product {
            name: name.to_string(),
            source,
            cost_sheet,
            tech_sheet,
            h1: structure.h1,
            h2,
            tech,
        },
        notes,
    })
}

/// Open and parse one workbook from disk.
pub fn load_product(path: &Path, layout: &SheetLayout) -> FcaResult<ParsedProduct> {
    let mut workbook = ExcelWorkbook::open(path)?;
    let name = sanitize_product_name(path);
    parse_product(&name, path.to_path_buf(), &mut workbook, layout)
}

/// Which two products a comparison looks at and how many rows it keeps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub product_a: String,
    pub product_b: String,
    pub top_n: usize,
}

/// All products of one session plus every note raised while loading them.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub products: Vec<Product>,
    pub notes: Vec<ParseNote>,
}

impl Session {
    /// Add a parse result, converting per-product failures into notes.
    pub fn absorb(&mut self, file: &str, result: FcaResult<ParsedProduct>) {
        match result {
            Ok(parsed) => {
                self.notes.extend(parsed.notes);
                self.push_product(parsed.product);
            }
            Err(e) => {
                let kind = match e {
                    FcaError::MissingSheet { .. } => NoteKind::MissingSheet,
                    _ => NoteKind::Unreadable,
                };
                warn!(file, error = %e, "product excluded");
                self.notes.push(ParseNote::new(file, kind, e.to_string()));
            }
        }
    }

    /// Products keep unique names; a clash gets a numeric suffix.
    fn push_product(&mut self, mut product: Product) {
        let base = product.name.clone();
        let mut n = 2;
        while self.get(&product.name).is_some() {
            product.name = format!("{}_{}", base, n);
            n += 1;
        }
        self.products.push(product);
    }

    pub fn get(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn has_fatal_notes(&self) -> bool {
        self.notes.iter().any(|n| n.kind.is_fatal())
    }

    /// Default selection: first and second product, or an error when fewer
    /// than two products are available.
    pub fn default_selection(&self, top_n: usize) -> FcaResult<Selection> {
        match self.products.as_slice() {
            [a, b, ..] => Ok(Selection {
                product_a: a.name.clone(),
                product_b: b.name.clone(),
                top_n,
            }),
            _ => Err(FcaError::Selection(format!(
                "need two products to compare, have {}",
                self.products.len()
            ))),
        }
    }

    fn pair(&self, selection: &Selection) -> FcaResult<(&Product, &Product)> {
        if selection.product_a == selection.product_b {
            return Err(FcaError::Selection(
                "choose two different products".to_string(),
            ));
        }
        let find = |name: &str| {
            self.get(name)
                .ok_or_else(|| FcaError::Selection(format!("unknown product '{}'", name)))
        };
        Ok((find(&selection.product_a)?, find(&selection.product_b)?))
    }

    /// Top H2 deviations for the selected pair.
    pub fn compare(&self, selection: &Selection) -> FcaResult<Vec<ComparisonRow>> {
        let (a, b) = self.pair(selection)?;
        Ok(compare_h2(a, b, Some(selection.top_n)))
    }

    /// H1 deviations for the selected pair.
    pub fn compare_h1(&self, selection: &Selection) -> FcaResult<Vec<H1Comparison>> {
        let (a, b) = self.pair(selection)?;
        Ok(compare_h1(a, b))
    }
}

/// Load every file; failures become notes, never errors.
pub fn load_products<P: AsRef<Path>>(paths: &[P], layout: &SheetLayout) -> Session {
    let mut session = Session::default();
    for path in paths {
        let path = path.as_ref();
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        session.absorb(&file, load_product(path, layout));
    }
    session
}
