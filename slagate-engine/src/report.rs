use serde::{Deserialize, Serialize};
use slagate_common::{Result, Sample, SlaConfig};

use crate::aggregate::{aggregate, StatBundle, Window};
use crate::breach::{evaluate, Breach};
use crate::rank::{rank, LabelRanking};

/// Statistics for the tracked label, or a marker that it never appeared in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "stats", rename_all = "snake_case")]
pub enum TrackedOutcome {
    Found(StatBundle),
    NotFound,
}

impl TrackedOutcome {
    pub fn bundle(&self) -> Option<&StatBundle> {
        match self {
            TrackedOutcome::Found(bundle) => Some(bundle),
            TrackedOutcome::NotFound => None,
        }
    }
}

/// The engine's complete answer for one run. Carries data only, no presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub compliant: bool,
    pub overall: StatBundle,
    pub overall_breaches: Vec<Breach>,
    pub tracked_label: String,
    pub tracked: TrackedOutcome,
    pub tracked_breaches: Vec<Breach>,
    pub window: Option<Window>,
    pub throughput_rps: Option<f64>,
    pub top_labels: Vec<LabelRanking>,
}

impl Verdict {
    pub fn breach_count(&self) -> usize {
        self.overall_breaches.len() + self.tracked_breaches.len()
    }
}

/// Aggregate `samples`, check them against `config`, and rank the slowest labels.
///
/// Fails only with [`slagate_common::SlaGateError::EmptyInput`]; what that means for the
/// run is the caller's decision.
pub fn assess(samples: &[Sample], config: &SlaConfig) -> Result<Verdict> {
    let agg = aggregate(samples, &config.tracked_label)?;

    let overall_breaches = evaluate(&agg.overall, &config.overall);
    let (tracked, tracked_breaches) = match agg.tracked {
        Some(bundle) => {
            let breaches = evaluate(&bundle, &config.tracked);
            (TrackedOutcome::Found(bundle), breaches)
        }
        None => (TrackedOutcome::NotFound, Vec::new()),
    };

    let throughput_rps = agg
        .window
        .map(|w| agg.overall.count as f64 / w.duration_secs());
    let top_labels = rank(&agg.by_label, config.top_n);

    Ok(Verdict {
        compliant: overall_breaches.is_empty() && tracked_breaches.is_empty(),
        overall: agg.overall,
        overall_breaches,
        tracked_label: config.tracked_label.clone(),
        tracked,
        tracked_breaches,
        window: agg.window,
        throughput_rps,
        top_labels,
    })
}
