//! H1 block scanner.
//!
//! Walks the H1 label row left to right from the layout's start column and
//! partitions the columns into contiguous blocks, then collects the valid H2
//! labels inside each block.

use super::cell::{read_text, Grid};
use super::label::is_valid_label;
use crate::layout::SheetLayout;
use tracing::debug;

/// Column range of one H1 plus the H2 label positions inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpan {
    pub label: String,
    pub start_col: usize,
    pub end_col: usize,
    /// `(column, label)` in column order.
    pub children: Vec<(usize, String)>,
}

#[derive(Debug)]
enum ScanState {
    NoBlock,
    InBlock { label: String, start_col: usize },
}

/// Partition the grid's columns into H1 blocks.
///
/// Columns left of the first valid H1 label belong to no block. The last
/// block always extends to the last column of the grid.
pub fn scan_blocks(grid: &Grid, layout: &SheetLayout) -> Vec<BlockSpan> {
    let width = grid.width();
    let mut spans = Vec::new();
    let mut state = ScanState::NoBlock;
    let mut previous: Option<String> = None;

    for col in layout.start_col..width {
        let cell = read_text(grid, layout.h1_row, col);
        let label = cell.as_deref().filter(|s| is_valid_label(s));

        if let Some(label) = label {
            let repeated = layout.merge_repeated_labels && previous.as_deref() == Some(label);
            if !repeated {
                if let ScanState::InBlock { label, start_col } = state {
                    spans.push(close_block(grid, layout, label, start_col, col - 1));
                }
                state = ScanState::InBlock {
                    label: label.to_string(),
                    start_col: col,
                };
            }
        }
        previous = cell;
    }

    if let ScanState::InBlock { label, start_col } = state {
        spans.push(close_block(grid, layout, label, start_col, width - 1));
    }

    if let Some(first) = spans.first() {
        let orphans = (layout.start_col..first.start_col)
            .filter(|&c| {
                read_text(grid, layout.h2_row, c).is_some_and(|s| is_valid_label(&s))
            })
            .count();
        if orphans > 0 {
            debug!(orphans, "H2 labels left of the first H1 block ignored");
        }
    }

    spans
}

fn close_block(
    grid: &Grid,
    layout: &SheetLayout,
    label: String,
    start_col: usize,
    end_col: usize,
) -> BlockSpan {
    let children: Vec<(usize, String)> = (start_col..=end_col)
        .filter_map(|c| {
            read_text(grid, layout.h2_row, c)
                .filter(|s| is_valid_label(s))
                .map(|s| (c, s))
        })
        .collect();
    debug!(
        h1 = %label,
        start_col,
        end_col,
        children = children.len(),
        "closed H1 block"
    );
    BlockSpan {
        label,
        start_col,
        end_col,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SheetLayout {
        SheetLayout {
            start_col: 1,
            ..SheetLayout::default()
        }
    }

    fn grid(h1: &[&str], h2: &[&str]) -> Grid {
        let mut g = Grid::new();
        for (c, v) in h1.iter().enumerate() {
            if !v.is_empty() {
                g.set(0, c, *v);
            }
        }
        for (c, v) in h2.iter().enumerate() {
            if !v.is_empty() {
                g.set(1, c, *v);
            }
        }
        g
    }

    #[test]
    fn test_two_blocks_partition() {
        let g = grid(
            &["Titel", "Komfort", "", "", "Sicherheit", ""],
            &["", "Sitz", "Klima", "Licht", "Bremse", "Sensor"],
        );
        let spans = scan_blocks(&g, &layout());
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start_col, spans[0].end_col), (1, 3));
        assert_eq!((spans[1].start_col, spans[1].end_col), (4, 5));
        assert_eq!(spans[0].children.len(), 3);
        assert_eq!(spans[1].children, vec![(4, "Bremse".to_string()), (5, "Sensor".to_string())]);
    }

    #[test]
    fn test_invalid_labels_do_not_open_blocks() {
        let g = grid(&["", "Komfort", "42%", "AB", "12"], &["", "Sitz", "Klima", "Licht", "Tür"]);
        let spans = scan_blocks(&g, &layout());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end_col, 4);
        assert_eq!(spans[0].children.len(), 4);
    }

    #[test]
    fn test_leading_noise_before_first_block() {
        let g = grid(&["", "", "Komfort", ""], &["", "Vorne", "Sitz", "Klima"]);
        let spans = scan_blocks(&g, &layout());
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start_col, 2);
        assert_eq!(spans[0].children.len(), 2);
    }

    #[test]
    fn test_repeated_label_continues_block() {
        let g = grid(&["", "Komfort", "Komfort", "Sicherheit"], &["", "Sitz", "Klima", "Bremse"]);
        let spans = scan_blocks(&g, &layout());
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start_col, spans[0].end_col), (1, 2));

        let strict = SheetLayout {
            merge_repeated_labels: false,
            ..layout()
        };
        assert_eq!(scan_blocks(&g, &strict).len(), 3);
    }

    #[test]
    fn test_block_without_children() {
        let g = grid(&["", "Komfort", "Design"], &["", "Sitz", ""]);
        let spans = scan_blocks(&g, &layout());
        assert_eq!(spans.len(), 2);
        assert!(spans[1].children.is_empty());
    }

    #[test]
    fn test_no_labels_no_blocks() {
        let g = grid(&["", "1", "2"], &["", "Sitz", "Klima"]);
        assert!(scan_blocks(&g, &layout()).is_empty());
        assert!(scan_blocks(&Grid::new(), &layout()).is_empty());
    }
}
