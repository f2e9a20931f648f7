use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::aggregate::StatBundle;

/// A per-label diagnostics row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRanking {
    pub label: String,
    pub p95_ms: Option<f64>,
    pub mean_ms: f64,
    pub error_rate_pct: f64,
    pub count: u64,
}

/// The `top_n` slowest labels by p95, slowest first.
///
/// The sort is stable, so labels with equal p95 keep the map's (first-seen) order.
/// A missing p95 sorts after every present one.
pub fn rank(by_label: &IndexMap<String, StatBundle>, top_n: usize) -> Vec<LabelRanking> {
    if top_n == 0 {
        return Vec::new();
    }

    let mut rows: Vec<LabelRanking> = by_label
        .iter()
        .map(|(label, bundle)| LabelRanking {
            label: label.clone(),
            p95_ms: bundle.p95_ms,
            mean_ms: bundle.mean_ms,
            error_rate_pct: bundle.error_rate_pct,
            count: bundle.count,
        })
        .collect();

    rows.sort_by(|a, b| descending_p95(a.p95_ms, b.p95_ms));
    rows.truncate(top_n);
    rows
}

fn descending_p95(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
