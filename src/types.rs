use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

//==============================================================================
// Extracted tables
//==============================================================================

/// A main function (H1) and the contiguous column range it spans.
///
/// `weight` is a fraction and `cost` is a plain number; either is `NaN` when
/// the cell was empty or not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H1Block {
    pub label: String,
    pub start_col: usize,
    pub end_col: usize,
    pub weight: f64,
    pub cost: f64,
    /// False when no valid sub-function label sits inside the block.
    pub has_children: bool,
}

impl H1Block {
    pub fn contains(&self, col: usize) -> bool {
        (self.start_col..=self.end_col).contains(&col)
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// True when `entry` sits inside this block's columns under its label.
    /// A label repeated with a gap forms separate blocks that share a name.
    pub fn owns(&self, entry: &H2Entry) -> bool {
        entry.parent_h1 == self.label && self.contains(entry.column)
    }
}

/// A sub-function (H2) attributed to exactly one H1 block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H2Entry {
    pub parent_h1: String,
    pub label: String,
    pub weight: f64,
    pub cost: f64,
    pub column: usize,
    /// Joined from the tech sheet; `None` when no score row matched.
    pub tech_score: Option<f64>,
}

/// One row of the technical evaluation sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechScore {
    pub label: String,
    pub score: f64,
}

/// One uploaded workbook, fully parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub source: PathBuf,
    pub cost_sheet: String,
    pub tech_sheet: Option<String>,
    pub h1: Vec<H1Block>,
    pub h2: Vec<H2Entry>,
    pub tech: Vec<TechScore>,
}

impl Product {
    /// Sub-functions of one H1 block, in column order.
    pub fn children<'a>(&'a self, block: &'a H1Block) -> impl Iterator<Item = &'a H2Entry> + 'a {
        self.h2.iter().filter(move |e| block.owns(e))
    }

    pub fn is_empty(&self) -> bool {
        self.h1.is_empty() && self.h2.is_empty()
    }

    pub fn has_tech(&self) -> bool {
        !self.tech.is_empty()
    }
}

//==============================================================================
// Derived tables
//==============================================================================

/// H2 cost of two products side by side. Missing costs are zero here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub h1: String,
    pub h2: String,
    pub cost_a: f64,
    pub cost_b: f64,
    /// `cost_b - cost_a`
    pub delta: f64,
    pub in_a: bool,
    pub in_b: bool,
}

impl ComparisonRow {
    pub fn abs_delta(&self) -> f64 {
        self.delta.abs()
    }
}

/// H1 cost of two products side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H1Comparison {
    pub h1: String,
    pub cost_a: f64,
    pub cost_b: f64,
    pub delta: f64,
}

/// Tech score rolled up to one H1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H1TechScore {
    pub h1: String,
    pub mean: Option<f64>,
    pub weighted: Option<f64>,
    /// Number of children that carried a score.
    pub scored: usize,
}

/// Declared H1 cost against the sum of its H2 costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostCheck {
    pub h1: String,
    pub h1_cost: f64,
    pub h2_sum: f64,
    /// `h1_cost - h2_sum`, `NaN` when the H1 cost is missing.
    pub delta: f64,
}

/// One H2 label across several products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub h2: String,
    pub values: Vec<Option<f64>>,
}

//==============================================================================
// Parse notes
//==============================================================================

/// Degraded-data conditions surfaced to the user instead of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Required cost sheet absent; product excluded.
    MissingSheet,
    /// Workbook could not be opened or read; product excluded.
    Unreadable,
    /// No tech sheet; tech tables stay empty.
    OptionalSheetMissing,
    /// Tech sheet present but unreadable; tech tables stay empty.
    TechUnreadable,
    /// No valid H1 label on the cost sheet; tables stay empty.
    NoBlocksDetected,
    /// An H1 block without any valid H2 label.
    EmptyBlock,
}

impl NoteKind {
    /// True when the product was excluded entirely.
    pub fn is_fatal(self) -> bool {
        matches!(self, NoteKind::MissingSheet | NoteKind::Unreadable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseNote {
    pub file: String,
    pub kind: NoteKind,
    pub message: String,
}

impl ParseNote {
    pub fn new(file: impl Into<String>, kind: NoteKind, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}
