//! Metric extraction: weights and costs for every detected H1 and H2.

use super::cell::{coerce_number, is_missing, normalize_weight, read_cell, Grid};
use super::scanner::{scan_blocks, BlockSpan};
use crate::layout::{EmptyBlockPolicy, SheetLayout};
use crate::types::{H1Block, H2Entry};

/// H1 and H2 tables of one cost-structure sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostStructure {
    pub h1: Vec<H1Block>,
    pub h2: Vec<H2Entry>,
}

impl CostStructure {
    pub fn is_empty(&self) -> bool {
        self.h1.is_empty()
    }

    /// Labels of H1 blocks that have no sub-functions.
    pub fn childless(&self) -> impl Iterator<Item = &str> {
        self.h1
            .iter()
            .filter(|b| !b.has_children)
            .map(|b| b.label.as_str())
    }
}

/// Scan the grid and read the weight and cost rows for every block.
pub fn extract_cost_structure(grid: &Grid, layout: &SheetLayout) -> CostStructure {
    let spans = scan_blocks(grid, layout);
    build_tables(grid, layout, spans)
}

fn build_tables(grid: &Grid, layout: &SheetLayout, spans: Vec<BlockSpan>) -> CostStructure {
    let mut out = CostStructure::default();

    for span in spans {
        let has_children = !span.children.is_empty();
        if !has_children && layout.empty_blocks == EmptyBlockPolicy::Drop {
            continue;
        }

        let weight = normalize_weight(
            Some(read_cell(grid, layout.h1_weight_row, span.start_col)),
            layout.weight_unit,
        );
        let mut cost = coerce_number(Some(read_cell(grid, layout.h1_cost_row, span.start_col)));
        if !has_children && is_missing(cost) {
            cost = 0.0;
        }

        for (column, label) in &span.children {
            out.h2.push(H2Entry {
                parent_h1: span.label.clone(),
                label: label.clone(),
                weight: normalize_weight(
                    Some(read_cell(grid, layout.h2_weight_row, *column)),
                    layout.weight_unit,
                ),
                cost: coerce_number(Some(read_cell(grid, layout.h2_cost_row, *column))),
                column: *column,
                tech_score: None,
            });
        }

        out.h1.push(H1Block {
            label: span.label,
            start_col: span.start_col,
            end_col: span.end_col,
            weight,
            cost,
            has_children,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::CellValue;

    fn layout() -> SheetLayout {
        SheetLayout {
            start_col: 2,
            ..SheetLayout::default()
        }
    }

    /// Columns 2..=3 "Antrieb" with two children, column 4 "Design" without.
    fn sample() -> Grid {
        let mut g = Grid::new();
        g.set(0, 2, "Antrieb");
        g.set(0, 4, "Design");
        g.set(1, 2, "Motor");
        g.set(1, 3, "Getriebe");
        g.set(3, 2, "60");
        g.set(3, 4, 0.4);
        g.set(4, 2, "70%");
        g.set(4, 3, 0.3);
        g.set(6, 2, "1.500,00");
        g.set(7, 2, "1.000,00");
        g.set(7, 3, CellValue::Text("keine Angabe".to_string()));
        g
    }

    #[test]
    fn test_extracts_weights_and_costs() {
        let s = extract_cost_structure(&sample(), &layout());
        assert_eq!(s.h1.len(), 2);
        assert_eq!(s.h1[0].label, "Antrieb");
        assert_eq!(s.h1[0].weight, 0.6);
        assert_eq!(s.h1[0].cost, 1500.0);
        assert_eq!(s.h2.len(), 2);
        assert_eq!(s.h2[0].weight, 0.7);
        assert_eq!(s.h2[0].cost, 1000.0);
        assert_eq!(s.h2[1].weight, 0.3);
        assert!(s.h2[1].cost.is_nan());
        assert!(s.h2.iter().all(|e| e.parent_h1 == "Antrieb"));
    }

    #[test]
    fn test_keep_policy_defaults_childless_cost_to_zero() {
        let s = extract_cost_structure(&sample(), &layout());
        let design = &s.h1[1];
        assert!(!design.has_children);
        assert_eq!(design.cost, 0.0);
        assert_eq!(design.weight, 0.4);
        assert_eq!(s.childless().collect::<Vec<_>>(), vec!["Design"]);
    }

    #[test]
    fn test_drop_policy_removes_childless() {
        let drop = SheetLayout {
            empty_blocks: EmptyBlockPolicy::Drop,
            ..layout()
        };
        let s = extract_cost_structure(&sample(), &drop);
        assert_eq!(s.h1.len(), 1);
        assert_eq!(s.h1[0].label, "Antrieb");
    }

    #[test]
    fn test_missing_values_stay_nan_for_blocks_with_children() {
        let mut g = Grid::new();
        g.set(0, 2, "Antrieb");
        g.set(1, 2, "Motor");
        let s = extract_cost_structure(&g, &layout());
        assert!(s.h1[0].cost.is_nan());
        assert!(s.h1[0].weight.is_nan());
        assert!(s.h2[0].cost.is_nan());
    }
}
