//! Cell access and numeric normalization.
//!
//! Every accessor here is fail-soft: out-of-range reads return
//! [`CellValue::Empty`] and unparseable numbers return `NaN`. Sparse,
//! hand-edited workbooks must never abort a parse.

use crate::layout::WeightUnit;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            CellValue::Bool(_) => false,
        }
    }

    /// Trimmed text form of the cell, `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            CellValue::Number(n) if n.is_nan() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Raw 2-D cell grid addressed by absolute (row, column), 0-based.
///
/// Rows may be ragged; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(CellValue::is_empty))
    }

    /// Set a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize_with(col + 1, CellValue::default);
        }
        r[col] = value.into();
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Read a cell; anything out of range is [`CellValue::Empty`].
pub fn read_cell(grid: &Grid, row: usize, col: usize) -> &CellValue {
    grid.get(row, col).unwrap_or(&EMPTY)
}

/// Trimmed text of a cell, `None` when the cell is empty or out of range.
pub fn read_text(grid: &Grid, row: usize, col: usize) -> Option<String> {
    read_cell(grid, row, col).as_text()
}

/// Missing-value test for coerced numbers.
pub fn is_missing(v: f64) -> bool {
    v.is_nan()
}

/// Coerce a cell into a number, `NaN` when it holds no numeric content.
pub fn coerce_number(value: Option<&CellValue>) -> f64 {
    match value {
        None | Some(CellValue::Empty) | Some(CellValue::Bool(_)) => f64::NAN,
        Some(CellValue::Number(n)) => *n,
        Some(CellValue::Text(s)) => coerce_str(s),
    }
}

/// Currency tokens stripped before parsing.
static CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)euro?|[€$£]").expect("static pattern compiles"));
/// At most one separator, taken as the decimal point.
static PLAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*[.,]?\d*$").expect("static pattern compiles"));
/// `1.234.567,89`
static DOT_GROUPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:\.\d{3})+(?:,\d+)?$").expect("static pattern compiles")
});
/// `1,234,567.89`
static COMMA_GROUPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:,\d{3})+(?:\.\d+)?$").expect("static pattern compiles")
});
/// `1'234'567.89`
static APOSTROPHE_GROUPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(?:'\d{3})+(?:[.,]\d+)?$").expect("static pattern compiles")
});

/// Parse a human-formatted number.
///
/// Currency tokens (any case), percent signs and whitespace are removed. A
/// single `,` or `.` is the decimal separator. Thousands groups must be
/// well formed: 1-3 leading digits, then groups of exactly three, optionally
/// followed by a decimal part using the other separator. Anything else, such
/// as `"1.5.2024"`, is not a number. The percent sign is dropped without
/// scaling: `"12,5%"` is `12.5`.
pub fn coerce_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("none")
    {
        return f64::NAN;
    }

    let cleaned: String = CURRENCY
        .replace_all(trimmed, "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .collect();

    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    if !digits.chars().any(|c| c.is_ascii_digit())
        || !digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '\''))
    {
        return f64::NAN;
    }

    let normalized = if PLAIN.is_match(digits) {
        digits.replace(',', ".")
    } else if DOT_GROUPED.is_match(digits) {
        digits.replace('.', "").replace(',', ".")
    } else if COMMA_GROUPED.is_match(digits) {
        digits.replace(',', "")
    } else if APOSTROPHE_GROUPED.is_match(digits) {
        digits.replace('\'', "").replace(',', ".")
    } else {
        tracing::trace!(value = raw, "malformed digit grouping");
        return f64::NAN;
    };

    match format!("{}{}", sign, normalized).parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            tracing::trace!(value = raw, "cell is not numeric");
            f64::NAN
        }
    }
}

/// True when a text cell carries an explicit percent sign.
fn has_percent_sign(value: Option<&CellValue>) -> bool {
    matches!(value, Some(CellValue::Text(s)) if s.contains('%'))
}

/// Coerce a weight cell into a fraction according to the declared unit.
///
/// With [`WeightUnit::Auto`] an explicit `%` always scales by 100; otherwise
/// values above 1.0 are taken as percentages and values up to 1.0 as
/// fractions already. A weight of exactly 1 is therefore read as 100 %.
pub fn normalize_weight(value: Option<&CellValue>, unit: WeightUnit) -> f64 {
    let v = coerce_number(value);
    if is_missing(v) {
        return v;
    }
    match unit {
        WeightUnit::Percent => v / 100.0,
        WeightUnit::Fraction => v,
        WeightUnit::Auto if has_percent_sign(value) || v > 1.0 => v / 100.0,
        WeightUnit::Auto => v,
    }
}
