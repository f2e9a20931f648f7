use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slagate_common::{Result, Sample, SlaGateError};

use crate::percentile::percentile;

/// Summary statistics for one group of samples (overall, one label, or the tracked label).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBundle {
    pub count: u64,
    pub error_count: u64,
    pub mean_ms: f64,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub error_rate_pct: f64,
}

/// Earliest and latest parseable timestamps. Only built when `end_ms > start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Window {
    pub fn duration_secs(&self) -> f64 {
        (self.end_ms - self.start_ms) as f64 / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub overall: StatBundle,
    /// One bundle per distinct label, in the order labels were first seen.
    pub by_label: IndexMap<String, StatBundle>,
    pub tracked: Option<StatBundle>,
    pub window: Option<Window>,
}

/// Running totals for one group. Latencies are kept so percentiles can be taken at the end.
#[derive(Default)]
struct GroupAccumulator {
    count: u64,
    error_count: u64,
    elapsed_ms: Vec<u64>,
}

impl GroupAccumulator {
    fn push(&mut self, sample: &Sample) {
        self.count += 1;
        if !sample.success {
            self.error_count += 1;
        }
        self.elapsed_ms.push(sample.elapsed_ms);
    }

    /// Returns `None` for a group that never received a sample.
    fn finish(mut self) -> Option<StatBundle> {
        if self.count == 0 {
            return None;
        }
        self.elapsed_ms.sort_unstable();
        let total: u128 = self.elapsed_ms.iter().map(|&v| v as u128).sum();
        let count = self.count as f64;
        Some(StatBundle {
            count: self.count,
            error_count: self.error_count,
            mean_ms: total as f64 / count,
            p95_ms: percentile(&self.elapsed_ms, 95.0),
            p99_ms: percentile(&self.elapsed_ms, 99.0),
            error_rate_pct: self.error_count as f64 * 100.0 / count,
        })
    }
}

#[derive(Default)]
struct WindowTracker {
    min_ms: Option<u64>,
    max_ms: Option<u64>,
}

impl WindowTracker {
    fn observe(&mut self, ts: u64) {
        self.min_ms = Some(self.min_ms.map_or(ts, |m| m.min(ts)));
        self.max_ms = Some(self.max_ms.map_or(ts, |m| m.max(ts)));
    }

    fn finish(self) -> Option<Window> {
        match (self.min_ms, self.max_ms) {
            (Some(start_ms), Some(end_ms)) if end_ms > start_ms => Some(Window { start_ms, end_ms }),
            _ => None,
        }
    }
}

/// Fold `samples` into overall, per-label and tracked-label statistics in a single pass.
///
/// Returns [`SlaGateError::EmptyInput`] when `samples` is empty.
pub fn aggregate(samples: &[Sample], tracked_label: &str) -> Result<Aggregation> {
    if samples.is_empty() {
        return Err(SlaGateError::EmptyInput);
    }

    let mut overall = GroupAccumulator::default();
    let mut tracked = GroupAccumulator::default();
    let mut by_label: IndexMap<String, GroupAccumulator> = IndexMap::new();
    let mut window = WindowTracker::default();

    for sample in samples {
        overall.push(sample);
        by_label.entry(sample.label.clone()).or_default().push(sample);
        if sample.label == tracked_label {
            tracked.push(sample);
        }
        if let Some(ts) = sample.timestamp_ms {
            window.observe(ts);
        }
    }

    let overall = overall.finish().ok_or(SlaGateError::EmptyInput)?;
    let by_label = by_label
        .into_iter()
        .filter_map(|(label, acc)| acc.finish().map(|bundle| (label, bundle)))
        .collect();

    Ok(Aggregation {
        overall,
        by_label,
        tracked: tracked.finish(),
        window: window.finish(),
    })
}
