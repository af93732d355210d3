//! Cross-product reconciliation.
//!
//! Every function here is pure: it borrows the products, recomputes from
//! scratch and returns a fresh table. An absent function counts as zero cost.

use super::cell::is_missing;
use crate::types::{ComparisonRow, CostCheck, H1Comparison, Product, SeriesRow};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Which H2 value a [`series_matrix`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMetric {
    #[default]
    Cost,
    Tech,
}

/// Insertion-ordered sums keyed by `K`; `None` until a numeric value arrives.
struct OrderedSums<K> {
    order: Vec<K>,
    sums: HashMap<K, Option<f64>>,
}

impl<K: std::hash::Hash + Eq + Clone> OrderedSums<K> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            sums: HashMap::new(),
        }
    }

    fn add(&mut self, key: K, value: f64) {
        let slot = self.sums.entry(key.clone()).or_insert_with(|| {
            self.order.push(key);
            None
        });
        if !is_missing(value) {
            *slot = Some(slot.unwrap_or(0.0) + value);
        }
    }

    fn get(&self, key: &K) -> Option<Option<f64>> {
        self.sums.get(key).copied()
    }
}

/// Keys of `a` in order, then keys only in `b` in order.
fn union_keys<K: std::hash::Hash + Eq + Clone>(a: &OrderedSums<K>, b: &OrderedSums<K>) -> Vec<K> {
    let mut keys = a.order.clone();
    keys.extend(b.order.iter().filter(|k| !a.sums.contains_key(*k)).cloned());
    keys
}

fn by_abs_delta_desc(x: f64, y: f64) -> Ordering {
    y.abs().partial_cmp(&x.abs()).unwrap_or(Ordering::Equal)
}

/// Compare H2 costs of two products.
///
/// Outer join on `(H1, H2)`; a missing side counts as 0. `delta` is
/// `cost_b - cost_a`. Rows are ranked by `|delta|` descending with ties kept
/// in key order, then truncated to `top_n` (`None` keeps all). Duplicate keys
/// inside one product are summed, and keys without a numeric cost on either
/// side are left out.
pub fn compare_h2(a: &Product, b: &Product, top_n: Option<usize>) -> Vec<ComparisonRow> {
    let sums = |p: &Product| {
        let mut s = OrderedSums::new();
        for e in &p.h2 {
            s.add((e.parent_h1.clone(), e.label.clone()), e.cost);
        }
        s
    };
    let (sa, sb) = (sums(a), sums(b));

    let mut rows: Vec<ComparisonRow> = union_keys(&sa, &sb)
        .into_iter()
        .filter_map(|key| {
            let ca = sa.get(&key);
            let cb = sb.get(&key);
            if ca.flatten().is_none() && cb.flatten().is_none() {
                return None;
            }
            let cost_a = ca.flatten().unwrap_or(0.0);
            let cost_b = cb.flatten().unwrap_or(0.0);
            Some(ComparisonRow {
                h1: key.0,
                h2: key.1,
                cost_a,
                cost_b,
                delta: cost_b - cost_a,
                in_a: ca.is_some(),
                in_b: cb.is_some(),
            })
        })
        .collect();

    rows.sort_by(|x, y| by_abs_delta_desc(x.delta, y.delta));
    if let Some(n) = top_n {
        rows.truncate(n);
    }
    rows
}

/// Compare H1 costs of two products, ranked like [`compare_h2`]. H1s without
/// a numeric cost in either product are left out.
pub fn compare_h1(a: &Product, b: &Product) -> Vec<H1Comparison> {
    let sums = |p: &Product| {
        let mut s = OrderedSums::new();
        for block in &p.h1 {
            s.add(block.label.clone(), block.cost);
        }
        s
    };
    let (sa, sb) = (sums(a), sums(b));

    let mut rows: Vec<H1Comparison> = union_keys(&sa, &sb)
        .into_iter()
        .filter_map(|h1| {
            let ca = sa.get(&h1).flatten();
            let cb = sb.get(&h1).flatten();
            if ca.is_none() && cb.is_none() {
                return None;
            }
            let cost_a = ca.unwrap_or(0.0);
            let cost_b = cb.unwrap_or(0.0);
            Some(H1Comparison {
                h1,
                cost_a,
                cost_b,
                delta: cost_b - cost_a,
            })
        })
        .collect();
    rows.sort_by(|x, y| by_abs_delta_desc(x.delta, y.delta));
    rows
}

/// Declared H1 cost against the sum of its sub-function costs.
pub fn cost_check(product: &Product) -> Vec<CostCheck> {
    product
        .h1
        .iter()
        .map(|block| {
            let h2_sum: f64 = product
                .children(block)
                .map(|e| e.cost)
                .filter(|c| !is_missing(*c))
                .sum();
            CostCheck {
                h1: block.label.clone(),
                h1_cost: block.cost,
                h2_sum,
                delta: block.cost - h2_sum,
            }
        })
        .collect()
}

/// One row per H2 label found in any product (sorted), one value per product.
///
/// A label that appears under several H1s in one product takes its first
/// numeric value.
pub fn series_matrix(products: &[Product], metric: SeriesMetric) -> Vec<SeriesRow> {
    let labels: BTreeSet<&str> = products
        .iter()
        .flat_map(|p| p.h2.iter().map(|e| e.label.as_str()))
        .collect();

    let lookups: Vec<HashMap<&str, f64>> = products
        .iter()
        .map(|p| {
            let mut map = HashMap::new();
            for e in &p.h2 {
                let value = match metric {
                    SeriesMetric::Cost => Some(e.cost).filter(|c| !is_missing(*c)),
                    SeriesMetric::Tech => e.tech_score,
                };
                if let Some(v) = value {
                    map.entry(e.label.as_str()).or_insert(v);
                }
            }
            map
        })
        .collect();

    labels
        .into_iter()
        .map(|h2| SeriesRow {
            h2: h2.to_string(),
            values: lookups.iter().map(|m| m.get(h2).copied()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{H1Block, H2Entry};
    use std::path::PathBuf;

    fn product(name: &str, h2: &[(&str, &str, f64)]) -> Product {
        let mut h1: Vec<H1Block> = Vec::new();
        for (i, (parent, _, _)) in h2.iter().enumerate() {
            match h1.last_mut() {
                Some(block) if block.label == *parent => block.end_col = i,
                _ => h1.push(H1Block {
                    label: parent.to_string(),
                    start_col: i,
                    end_col: i,
                    weight: f64::NAN,
                    cost: f64::NAN,
                    has_children: true,
                }),
            }
        }
        Product {
            name: name.to_string(),
            source: PathBuf::from(format!("{}.xlsx", name)),
            cost_sheet: "Kosten".to_string(),
            tech_sheet: None,
            h1,
            h2: h2
                .iter()
                .enumerate()
                .map(|(i, (parent, label, cost))| H2Entry {
                    parent_h1: parent.to_string(),
                    label: label.to_string(),
                    weight: f64::NAN,
                    cost: *cost,
                    column: i,
                    tech_score: None,
                })
                .collect(),
            tech: Vec::new(),
        }
    }

    #[test]
    fn test_zero_fill_and_stable_ties() {
        let a = product("A", &[("Safety", "Brake", 100.0)]);
        let b = product("B", &[("Safety", "Brake", 80.0), ("Safety", "Sensor", 20.0)]);
        let rows = compare_h2(&a, &b, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].h2, "Brake");
        assert_eq!(rows[0].delta, -20.0);
        assert_eq!(rows[1].h2, "Sensor");
        assert_eq!(rows[1].cost_a, 0.0);
        assert_eq!(rows[1].delta, 20.0);
        assert!(!rows[1].in_a && rows[1].in_b);

        let top = compare_h2(&a, &b, Some(1));
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].abs_delta(), 20.0);
    }

    #[test]
    fn test_ranked_by_absolute_delta() {
        let a = product("A", &[("X", "small", 10.0), ("X", "big", 10.0)]);
        let b = product("B", &[("X", "small", 12.0), ("X", "big", -90.0)]);
        let rows = compare_h2(&a, &b, Some(10));
        assert_eq!(rows[0].h2, "big");
        assert_eq!(rows[0].delta, -100.0);
    }

    #[test]
    fn test_same_h2_under_different_h1_are_distinct_keys() {
        let a = product("A", &[("X", "Gehäuse", 5.0), ("Y", "Gehäuse", 7.0)]);
        let b = product("B", &[("X", "Gehäuse", 5.0)]);
        let rows = compare_h2(&a, &b, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].h1, "Y");
        assert_eq!(rows[0].delta, -7.0);
    }

    #[test]
    fn test_duplicates_summed_and_all_missing_dropped() {
        let a = product("A", &[("X", "Teil", 5.0), ("X", "Teil", 7.0), ("X", "leer", f64::NAN)]);
        let b = product("B", &[("X", "leer", f64::NAN)]);
        let rows = compare_h2(&a, &b, None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cost_a, 12.0);
    }

    #[test]
    fn test_compare_h1_zero_fill() {
        let mut a = product("A", &[("Komfort", "Sitz", 1.0)]);
        a.h1[0].cost = 300.0;
        let mut b = product("B", &[("Komfort", "Sitz", 1.0), ("Antrieb", "Motor", 1.0)]);
        b.h1[0].cost = 250.0;
        b.h1[1].cost = 400.0;
        let rows = compare_h1(&a, &b);
        assert_eq!(rows[0].h1, "Antrieb");
        assert_eq!(rows[0].cost_a, 0.0);
        assert_eq!(rows[1].delta, -50.0);
    }

    #[test]
    fn test_compare_h1_drops_h1_without_costs() {
        let mut a = product("A", &[("Komfort", "Sitz", 1.0), ("Design", "Form", 1.0)]);
        a.h1[0].cost = 300.0;
        let mut b = product("B", &[("Komfort", "Sitz", 1.0), ("Design", "Form", 1.0)]);
        b.h1[0].cost = 250.0;

        let rows = compare_h1(&a, &b);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].h1, "Komfort");
    }

    #[test]
    fn test_cost_check() {
        let mut p = product("A", &[("Komfort", "Sitz", 100.0), ("Komfort", "Klima", f64::NAN)]);
        p.h1[0].cost = 120.0;
        let check = cost_check(&p);
        assert_eq!(check[0].h2_sum, 100.0);
        assert_eq!(check[0].delta, 20.0);
    }

    #[test]
    fn test_cost_check_repeated_h1_label() {
        let mut p = product(
            "A",
            &[("Komfort", "Sitz", 100.0), ("Sicherheit", "Bremse", 10.0), ("Komfort", "Klima", 50.0)],
        );
        assert_eq!(p.h1.len(), 3);
        p.h1[0].cost = 100.0;
        p.h1[1].cost = 10.0;
        p.h1[2].cost = 50.0;

        let check = cost_check(&p);
        let sums: Vec<f64> = check.iter().map(|c| c.h2_sum).collect();
        assert_eq!(sums, vec![100.0, 10.0, 50.0]);
        assert!(check.iter().all(|c| c.delta == 0.0));
    }

    #[test]
    fn test_series_matrix_union_sorted() {
        let mut a = product("A", &[("X", "Sitz", 1.0), ("X", "Klima", 2.0)]);
        a.h2[0].tech_score = Some(1.5);
        let b = product("B", &[("X", "Bremse", 3.0)]);

        let costs = series_matrix(&[a.clone(), b.clone()], SeriesMetric::Cost);
        let labels: Vec<&str> = costs.iter().map(|r| r.h2.as_str()).collect();
        assert_eq!(labels, vec!["Bremse", "Klima", "Sitz"]);
        assert_eq!(costs[0].values, vec![None, Some(3.0)]);

        let tech = series_matrix(&[a, b], SeriesMetric::Tech);
        assert_eq!(tech[2].values, vec![Some(1.5), None]);
        assert_eq!(tech[1].values, vec![None, None]);
    }
}
