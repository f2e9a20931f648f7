use serde::{Deserialize, Serialize};
use slagate_common::ThresholdSet;
use std::fmt;

use crate::aggregate::StatBundle;

/// One violated SLA rule. `Display` gives the short form used in reports,
/// e.g. `p95 280ms > 250ms` or `errors 2.00% > 1.00%`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Breach {
    P95 { actual_ms: f64, limit_ms: u64 },
    P99 { actual_ms: f64, limit_ms: u64 },
    ErrorRate { actual_pct: f64, limit_pct: f64 },
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breach::P95 { actual_ms, limit_ms } => write!(f, "p95 {actual_ms:.0}ms > {limit_ms}ms"),
            Breach::P99 { actual_ms, limit_ms } => write!(f, "p99 {actual_ms:.0}ms > {limit_ms}ms"),
            Breach::ErrorRate { actual_pct, limit_pct } => {
                write!(f, "errors {actual_pct:.2}% > {limit_pct:.2}%")
            }
        }
    }
}

/// Check `bundle` against `thresholds`. The result is always ordered p95, p99, error rate.
/// Every comparison is strict: a value equal to its limit passes.
pub fn evaluate(bundle: &StatBundle, thresholds: &ThresholdSet) -> Vec<Breach> {
    let mut breaches = Vec::new();

    if let Some(p95) = bundle.p95_ms {
        if p95 > thresholds.p95_limit_ms as f64 {
            breaches.push(Breach::P95 { actual_ms: p95, limit_ms: thresholds.p95_limit_ms });
        }
    }
    if let Some(p99) = bundle.p99_ms {
        if p99 > thresholds.p99_limit_ms as f64 {
            breaches.push(Breach::P99 { actual_ms: p99, limit_ms: thresholds.p99_limit_ms });
        }
    }
    if bundle.error_rate_pct > thresholds.error_rate_limit_pct {
        breaches.push(Breach::ErrorRate {
            actual_pct: bundle.error_rate_pct,
            limit_pct: thresholds.error_rate_limit_pct,
        });
    }

    breaches
}
