//! Technical evaluation scores: reading, joining onto H2, rolling up to H1.

use super::cell::{coerce_number, is_missing, read_cell, read_text, Grid};
use crate::layout::SheetLayout;
use crate::types::{H1Block, H1TechScore, H2Entry, TechScore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// How child scores are combined into an H1 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechAggregation {
    /// Plain mean of the scored children.
    #[default]
    Mean,
    /// Mean weighted by the children's H2 weights.
    Weighted,
}

/// Read `(label, score)` rows from the tech sheet.
///
/// Header rows are skipped; rows with an empty label or a non-numeric score
/// are ignored.
pub fn read_tech_scores(grid: &Grid, layout: &SheetLayout) -> Vec<TechScore> {
    let rows: Vec<TechScore> = (layout.tech_header_rows..grid.height())
        .filter_map(|row| {
            let label = read_text(grid, row, layout.tech_label_col)?;
            let score = coerce_number(Some(read_cell(grid, row, layout.tech_score_col)));
            (!is_missing(score)).then_some(TechScore { label, score })
        })
        .collect();
    debug!(rows = rows.len(), "read tech scores");
    rows
}

/// Label → score lookup; later rows overwrite earlier ones.
pub fn score_map(scores: &[TechScore]) -> HashMap<&str, f64> {
    scores
        .iter()
        .map(|s| (s.label.trim(), s.score))
        .collect()
}

/// Attach scores to H2 entries by exact, trimmed label. Unmatched entries get `None`.
pub fn join_tech(h2: &[H2Entry], scores: &[TechScore]) -> Vec<H2Entry> {
    let lookup = score_map(scores);
    h2.iter()
        .map(|entry| H2Entry {
            tech_score: lookup.get(entry.label.trim()).copied(),
            ..entry.clone()
        })
        .collect()
}

/// Mean of the present scores, `None` when there are none.
pub fn mean_score<'a>(children: impl IntoIterator<Item = &'a H2Entry>) -> Option<f64> {
    let scores: Vec<f64> = children.into_iter().filter_map(|e| e.tech_score).collect();
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Weight-weighted mean of the present scores.
///
/// Weights of the scored children are normalised to sum to 1; a missing
/// weight counts as 0. Falls back to [`mean_score`] when all weights are
/// missing or zero.
pub fn weighted_score<'a>(children: impl IntoIterator<Item = &'a H2Entry>) -> Option<f64> {
    let scored: Vec<(f64, f64)> = children
        .into_iter()
        .filter_map(|e| {
            let weight = if is_missing(e.weight) { 0.0 } else { e.weight };
            e.tech_score.map(|s| (s, weight))
        })
        .collect();
    if scored.is_empty() {
        return None;
    }

    let total: f64 = scored.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        let n = scored.len() as f64;
        return Some(scored.iter().map(|(s, _)| s).sum::<f64>() / n);
    }
    Some(scored.iter().map(|(s, w)| s * (w / total)).sum())
}

/// Roll child scores up to every H1, in H1 order.
pub fn aggregate_tech(h1: &[H1Block], h2: &[H2Entry]) -> Vec<H1TechScore> {
    h1.iter()
        .map(|block| {
            let children: Vec<&H2Entry> =
                h2.iter().filter(|e| block.owns(e)).collect();
            H1TechScore {
                h1: block.label.clone(),
                mean: mean_score(children.iter().copied()),
                weighted: weighted_score(children.iter().copied()),
                scored: children.iter().filter(|e| e.tech_score.is_some()).count(),
            }
        })
        .collect()
}

impl H1TechScore {
    pub fn value(&self, mode: TechAggregation) -> Option<f64> {
        match mode {
            TechAggregation::Mean => self.mean,
            TechAggregation::Weighted => self.weighted,
        }
    }
}
