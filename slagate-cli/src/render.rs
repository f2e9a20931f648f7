//! Slack `mrkdwn` rendering of a [`Verdict`].

use chrono::{DateTime, FixedOffset, Utc};
use slagate_common::{Result, SlaConfig, SlaGateError, ThresholdSet};
use slagate_engine::{Breach, StatBundle, TrackedOutcome, Verdict};

/// The fixed offset report timestamps are shown in, plus the suffix printed after them.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayZone {
    pub offset: FixedOffset,
    pub label: String,
}

impl DisplayZone {
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                SlaGateError::InvalidConfig(format!("UTC offset of {minutes} minutes is out of range"))
            })?;
        let label = match minutes {
            0 => "UTC".to_string(),
            330 => "IST".to_string(),
            m => {
                let sign = if m < 0 { '-' } else { '+' };
                format!("UTC{sign}{:02}:{:02}", m.abs() / 60, m.abs() % 60)
            }
        };
        Ok(Self { offset, label })
    }
}

/// `2023-11-14 22:13:20 UTC`-style rendering of an epoch-millisecond timestamp.
pub fn format_timestamp(epoch_ms: u64, zone: &DisplayZone) -> String {
    match i64::try_from(epoch_ms).ok().and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(utc) => format!(
            "{} {}",
            utc.with_timezone(&zone.offset).format("%Y-%m-%d %H:%M:%S"),
            zone.label
        ),
        None => format!("{epoch_ms}ms"),
    }
}

pub fn render_empty_input(test_name: &str) -> String {
    format!("⚠️ SLA Check: JTL is empty (0 samples). Test: {test_name}")
}

pub fn render_verdict(verdict: &Verdict, config: &SlaConfig, test_name: &str, zone: &DisplayZone) -> String {
    let mut msg = String::new();

    let header = if verdict.compliant { "✅ *SLA OK*" } else { "🚨 *SLA BREACH DETECTED*" };
    push_line(&mut msg, header);
    push_line(&mut msg, &format!("*Test:* {test_name}"));

    if let Some(window) = verdict.window {
        push_line(
            &mut msg,
            &format!(
                "*Window:* {} → {}",
                format_timestamp(window.start_ms, zone),
                format_timestamp(window.end_ms, zone)
            ),
        );
        let rps = verdict.throughput_rps.unwrap_or_default();
        push_line(
            &mut msg,
            &format!("*Duration:* {:.0}s | *Throughput:* {rps:.2} req/s", window.duration_secs()),
        );
    }

    push_line(&mut msg, "*Overall:*");
    push_bundle(&mut msg, &verdict.overall, &config.overall, &verdict.overall_breaches);

    match &verdict.tracked {
        TrackedOutcome::Found(bundle) => {
            push_line(&mut msg, &format!("\n*Transaction:* `{}`", verdict.tracked_label));
            push_bundle(&mut msg, bundle, &config.tracked, &verdict.tracked_breaches);
        }
        TrackedOutcome::NotFound => {
            push_line(
                &mut msg,
                &format!("\nℹ️ Transaction label not found in JTL: `{}`", verdict.tracked_label),
            );
        }
    }

    if !verdict.top_labels.is_empty() {
        push_line(&mut msg, "\n*Top slow labels (by p95):*");
        for row in &verdict.top_labels {
            push_line(
                &mut msg,
                &format!(
                    "• `{}` — p95 {}, avg {:.0}ms, err {:.2}% (n={})",
                    row.label,
                    fmt_ms(row.p95_ms),
                    row.mean_ms,
                    row.error_rate_pct,
                    row.count
                ),
            );
        }
    }

    msg
}

fn push_line(msg: &mut String, text: &str) {
    msg.push_str(text);
    msg.push('\n');
}

fn push_bundle(msg: &mut String, bundle: &StatBundle, rules: &ThresholdSet, breaches: &[Breach]) {
    push_line(
        msg,
        &format!(
            "• samples={} | errors={} ({:.2}%)",
            bundle.count, bundle.error_count, bundle.error_rate_pct
        ),
    );
    push_line(
        msg,
        &format!(
            "• avg={:.0}ms | p95={} | p99={}",
            bundle.mean_ms,
            fmt_ms(bundle.p95_ms),
            fmt_ms(bundle.p99_ms)
        ),
    );
    push_line(
        msg,
        &format!(
            "• rules: p95<={}ms, p99<={}ms, errors<={:.2}%",
            rules.p95_limit_ms, rules.p99_limit_ms, rules.error_rate_limit_pct
        ),
    );
    if !breaches.is_empty() {
        let joined: Vec<String> = breaches.iter().map(ToString::to_string).collect();
        push_line(msg, &format!("• breaches: {}", joined.join(", ")));
    }
}

fn fmt_ms(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.0}ms"),
        None => "n/a".to_string(),
    }
}
