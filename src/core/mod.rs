//! Parsing core: cell grid → labels → blocks → tables → comparisons

pub mod cell;
pub mod extractor;
pub mod label;
pub mod reconcile;
pub mod scanner;
pub mod tech;

pub use cell::{coerce_number, coerce_str, normalize_weight, read_cell, CellValue, Grid};
pub use extractor::{extract_cost_structure, CostStructure};
pub use label::is_valid_label;
pub use reconcile::{compare_h1, compare_h2, cost_check, series_matrix, SeriesMetric};
pub use scanner::{scan_blocks, BlockSpan};
pub use tech::{aggregate_tech, join_tech, read_tech_scores, TechAggregation};
