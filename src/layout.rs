//! Positional layout of a functional cost analysis workbook.
//!
//! The row and column offsets used to be hard-wired; they are now a value
//! passed into the extractor so other workbook layouts need no code changes.
//! A layout can be loaded from YAML; any key left out keeps its default.
//!
//! ```yaml
//! start_col: 8
//! h1_row: 0
//! h2_row: 1
//! weight_unit: auto
//! empty_blocks: keep
//! cost_sheet:
//!   - exact: SLAVE_Funktions-Kostenstruktur
//!   - contains_all: [funktion, kosten]
//! ```

use crate::error::{FcaError, FcaResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Excel's last column index (XFD), 0-based.
const MAX_COL: usize = 16_383;
/// Excel's last row index, 0-based.
const MAX_ROW: usize = 1_048_575;

/// How weight cells are scaled into fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    /// Explicit `%` or a value above 1.0 means percent, otherwise fraction.
    #[default]
    Auto,
    /// Cells are always percentages (0–100).
    Percent,
    /// Cells are always fractions (0–1).
    Fraction,
}

/// What to do with an H1 block that has no valid H2 labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBlockPolicy {
    /// Keep the H1, flag it as childless, default a missing cost to 0.
    #[default]
    Keep,
    /// Treat the H1 as noise and drop it.
    Drop,
}

/// One sheet discovery strategy. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetMatcher {
    Exact(String),
    ContainsAll(Vec<String>),
    ContainsAny(Vec<String>),
    First,
}

impl SheetMatcher {
    fn matches(&self, sheet_name: &str) -> bool {
        let low = sheet_name.to_lowercase();
        match self {
            SheetMatcher::Exact(name) => low == name.to_lowercase(),
            SheetMatcher::ContainsAll(tokens) => {
                tokens.iter().all(|t| low.contains(&t.to_lowercase()))
            }
            SheetMatcher::ContainsAny(tokens) => {
                tokens.iter().any(|t| low.contains(&t.to_lowercase()))
            }
            SheetMatcher::First => true,
        }
    }
}

/// Resolve a sheet by trying each strategy in order; the first strategy with a
/// hit wins, and within a strategy the first sheet in workbook order wins.
pub fn find_sheet<'a>(sheet_names: &'a [String], strategies: &[SheetMatcher]) -> Option<&'a str> {
    strategies.iter().find_map(|strategy| {
        sheet_names
            .iter()
            .find(|name| strategy.matches(name))
            .map(String::as_str)
    })
}

/// Row/column contract of the cost-structure and tech sheets (0-based).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// First column scanned for H1 labels (column I).
    pub start_col: usize,
    pub h1_row: usize,
    pub h2_row: usize,
    pub h1_weight_row: usize,
    pub h2_weight_row: usize,
    pub h1_cost_row: usize,
    pub h2_cost_row: usize,
    pub weight_unit: WeightUnit,
    pub empty_blocks: EmptyBlockPolicy,
    /// A label repeated in the next column continues the same H1 block.
    pub merge_repeated_labels: bool,

    pub tech_label_col: usize,
    pub tech_score_col: usize,
    /// Leading rows of the tech sheet that are headers.
    pub tech_header_rows: usize,

    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub cost_sheet: Vec<SheetMatcher>,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub tech_sheet: Vec<SheetMatcher>,

    /// Default number of rows kept by a comparison.
    pub top_n: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            start_col: 8,
            h1_row: 0,
            h2_row: 1,
            h1_weight_row: 3,
            h2_weight_row: 4,
            h1_cost_row: 6,
            h2_cost_row: 7,
            weight_unit: WeightUnit::Auto,
            empty_blocks: EmptyBlockPolicy::Keep,
            merge_repeated_labels: true,
            tech_label_col: 1,
            tech_score_col: 17,
            tech_header_rows: 4,
            cost_sheet: vec![
                SheetMatcher::Exact("SLAVE_Funktions-Kostenstruktur".to_string()),
                SheetMatcher::ContainsAll(vec!["funktion".to_string(), "kosten".to_string()]),
            ],
            tech_sheet: vec![
                SheetMatcher::Exact("SLAVE_Techn.Bewertung".to_string()),
                SheetMatcher::ContainsAll(vec!["techn".to_string(), "bewert".to_string()]),
                SheetMatcher::ContainsAny(vec!["techn".to_string(), "bewert".to_string()]),
            ],
            top_n: 10,
        }
    }
}

impl SheetLayout {
    /// Human-readable name of the cost sheet, used in error messages.
    pub fn cost_sheet_description(&self) -> String {
        describe(&self.cost_sheet)
    }

    pub fn validate(&self) -> FcaResult<()> {
        let rows = [
            ("h1_row", self.h1_row),
            ("h2_row", self.h2_row),
            ("h1_weight_row", self.h1_weight_row),
            ("h2_weight_row", self.h2_weight_row),
            ("h1_cost_row", self.h1_cost_row),
            ("h2_cost_row", self.h2_cost_row),
            ("tech_header_rows", self.tech_header_rows),
        ];
        for (name, row) in rows {
            if row > MAX_ROW {
                return Err(FcaError::Config(format!(
                    "{} = {} is beyond the last Excel row",
                    name, row
                )));
            }
        }

        let cols = [
            ("start_col", self.start_col),
            ("tech_label_col", self.tech_label_col),
            ("tech_score_col", self.tech_score_col),
        ];
        for (name, col) in cols {
            if col > MAX_COL {
                return Err(FcaError::Config(format!(
                    "{} = {} is beyond the last Excel column",
                    name, col
                )));
            }
        }

        if self.h1_row == self.h2_row {
            return Err(FcaError::Config(
                "h1_row and h2_row must be different rows".to_string(),
            ));
        }
        if self.cost_sheet.is_empty() {
            return Err(FcaError::Config(
                "cost_sheet needs at least one matcher".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(FcaError::Config("top_n must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn describe(strategies: &[SheetMatcher]) -> String {
    strategies
        .iter()
        .map(|s| match s {
            SheetMatcher::Exact(name) => format!("'{}'", name),
            SheetMatcher::ContainsAll(tokens) => format!("*{}*", tokens.join("*")),
            SheetMatcher::ContainsAny(tokens) => format!("any of {}", tokens.join("/")),
            SheetMatcher::First => "first sheet".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Load and validate a layout from a YAML file.
pub fn load_layout(path: &Path) -> FcaResult<SheetLayout> {
    let content = std::fs::read_to_string(path)?;
    parse_layout(&content)
}

/// Parse and validate a layout from YAML text.
pub fn parse_layout(yaml: &str) -> FcaResult<SheetLayout> {
    let layout: SheetLayout = serde_yaml::from_str(yaml)?;
    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_layout_is_valid() {
        let layout = SheetLayout::default();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.start_col, 8);
        assert_eq!(layout.tech_score_col, 17);
    }

    #[test]
    fn test_find_sheet_prefers_exact_over_substring() {
        let sheets = names(&["Funktionskosten alt", "SLAVE_Funktions-Kostenstruktur"]);
        let layout = SheetLayout::default();
        assert_eq!(
            find_sheet(&sheets, &layout.cost_sheet),
            Some("SLAVE_Funktions-Kostenstruktur")
        );
    }

    #[test]
    fn test_find_sheet_substring_case_insensitive() {
        let sheets = names(&["Deckblatt", "FUNKTIONS-KOSTEN"]);
        let layout = SheetLayout::default();
        assert_eq!(find_sheet(&sheets, &layout.cost_sheet), Some("FUNKTIONS-KOSTEN"));
    }

    #[test]
    fn test_find_sheet_none_without_fallback() {
        let sheets = names(&["Deckblatt", "Daten"]);
        let layout = SheetLayout::default();
        assert_eq!(find_sheet(&sheets, &layout.cost_sheet), None);
        let with_first = [SheetMatcher::Exact("x".to_string()), SheetMatcher::First];
        assert_eq!(find_sheet(&sheets, &with_first), Some("Deckblatt"));
    }

    #[test]
    fn test_tech_sheet_any_token() {
        let sheets = names(&["Kosten", "Bewertung"]);
        let layout = SheetLayout::default();
        assert_eq!(find_sheet(&sheets, &layout.tech_sheet), Some("Bewertung"));
    }

    #[test]
    fn test_parse_layout_partial_yaml_keeps_defaults() {
        let layout = parse_layout("start_col: 2\nweight_unit: percent\nempty_blocks: drop\n").unwrap();
        assert_eq!(layout.start_col, 2);
        assert_eq!(layout.weight_unit, WeightUnit::Percent);
        assert_eq!(layout.empty_blocks, EmptyBlockPolicy::Drop);
        assert_eq!(layout.h2_cost_row, 7);
    }

    #[test]
    fn test_parse_layout_matchers() {
        let yaml = "cost_sheet:\n  - contains_any: [cost]\n  - first\n";
        let layout = parse_layout(yaml).unwrap();
        assert_eq!(
            layout.cost_sheet,
            vec![
                SheetMatcher::ContainsAny(vec!["cost".to_string()]),
                SheetMatcher::First
            ]
        );
    }

    #[test]
    fn test_parse_layout_rejects_same_label_rows() {
        let result = parse_layout("h1_row: 1\nh2_row: 1\n");
        assert!(matches!(result, Err(FcaError::Config(_))));
    }

    #[test]
    fn test_parse_layout_rejects_zero_top_n() {
        assert!(parse_layout("top_n: 0\n").is_err());
    }

    #[test]
    fn test_cost_sheet_description() {
        let layout = SheetLayout::default();
        assert_eq!(
            layout.cost_sheet_description(),
            "'SLAVE_Funktions-Kostenstruktur' or *funktion*kosten*"
        );
    }
}
