use slagate_common::{RawRecord, Sample};
use std::fmt;
use tracing::{debug, warn};

/// Which numeric column of a row could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleField {
    Elapsed,
    TimeStamp,
}

impl fmt::Display for SampleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleField::Elapsed => write!(f, "elapsed"),
            SampleField::TimeStamp => write!(f, "timeStamp"),
        }
    }
}

/// A non-fatal ingestion problem. The row is still kept, with the field defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSample {
    /// 1-based data row in the log (the header is not counted). Rows the reader skipped
    /// still count, so this matches a line-by-line view of the file.
    pub row: usize,
    pub field: SampleField,
    /// The text as it appeared in the log; empty when the column was missing.
    pub raw: String,
}

pub struct Ingested {
    pub samples: Vec<Sample>,
    pub warnings: Vec<MalformedSample>,
}

/// Normalize raw log rows into samples.
///
/// Never fails: a bad `elapsed` becomes 0 and a bad `timeStamp` becomes `None`, and each
/// substitution is reported in [`Ingested::warnings`].
pub fn ingest<I>(records: I) -> Ingested
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut samples = Vec::new();
    let mut warnings = Vec::new();

    for (idx, record) in records.into_iter().enumerate() {
        let row = record.row.unwrap_or(idx + 1);
        let (sample, row_warnings) = normalize(row, record);
        samples.push(sample);
        warnings.extend(row_warnings);
    }

    for w in &warnings {
        debug!(row = w.row, field = %w.field, raw = %w.raw, "coerced malformed field");
    }
    if !warnings.is_empty() {
        warn!(
            malformed = warnings.len(),
            samples = samples.len(),
            "result log contains malformed numeric fields; defaults substituted"
        );
    }

    Ingested { samples, warnings }
}

fn normalize(row: usize, record: RawRecord) -> (Sample, Vec<MalformedSample>) {
    let mut warnings = Vec::new();

    let label = record.label.as_deref().unwrap_or("").trim().to_string();
    let success = record
        .success
        .as_deref()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case("true"));

    let elapsed_ms = match parse_millis(record.elapsed.as_deref()) {
        Some(ms) => ms,
        None => {
            warnings.push(malformed(row, SampleField::Elapsed, record.elapsed));
            0
        }
    };

    let timestamp_ms = parse_millis(record.time_stamp.as_deref());
    if timestamp_ms.is_none() {
        warnings.push(malformed(row, SampleField::TimeStamp, record.time_stamp));
    }

    let sample = Sample { label, success, elapsed_ms, timestamp_ms };
    (sample, warnings)
}

fn malformed(row: usize, field: SampleField, raw: Option<String>) -> MalformedSample {
    MalformedSample { row, field, raw: raw.unwrap_or_default() }
}

/// Parse a millisecond count. Decimal text is accepted and truncated toward zero
/// (`"12.7"` → 12). Returns `None` for missing, blank, non-numeric, non-finite or
/// negative input.
pub fn parse_millis(raw: Option<&str>) -> Option<u64> {
    let text = raw?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(v) = text.parse::<u64>() {
        return Some(v);
    }
    let v = text.parse::<f64>().ok()?;
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    Some(v.trunc() as u64)
}
