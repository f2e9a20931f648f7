use slagate_engine::{TrackedOutcome, Verdict};
use std::fmt;
use std::io::Write;

use crate::config::EmptyInputPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Notice => write!(f, "notice"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Annotation {
    fn new(severity: Severity, title: &str, message: impl Into<String>) -> Self {
        Self { severity, title: title.to_string(), message: message.into() }
    }
}

/// Destination for CI annotations.
pub trait AnnotationSink {
    fn emit(&mut self, annotation: &Annotation) -> std::io::Result<()>;
}

/// Collects annotations in memory.
impl AnnotationSink for Vec<Annotation> {
    fn emit(&mut self, annotation: &Annotation) -> std::io::Result<()> {
        self.push(annotation.clone());
        Ok(())
    }
}

/// Writes GitHub Actions workflow commands (`::error title=...::message`).
pub struct GithubActions<W: Write> {
    out: W,
}

impl<W: Write> GithubActions<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AnnotationSink for GithubActions<W> {
    fn emit(&mut self, annotation: &Annotation) -> std::io::Result<()> {
        writeln!(
            self.out,
            "::{} title={}::{}",
            annotation.severity,
            escape_property(&annotation.title),
            escape_data(&annotation.message)
        )
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// One error per breach, plus warnings for a missing tracked label or coerced rows.
/// A compliant run gets a single summary notice.
pub fn annotations_for(verdict: &Verdict, malformed_fields: usize) -> Vec<Annotation> {
    let mut out = Vec::new();

    for breach in &verdict.overall_breaches {
        out.push(Annotation::new(Severity::Error, "SLA breach (overall)", breach.to_string()));
    }
    for breach in &verdict.tracked_breaches {
        out.push(Annotation::new(
            Severity::Error,
            "SLA breach (transaction)",
            format!("{}: {breach}", verdict.tracked_label),
        ));
    }

    if verdict.tracked == TrackedOutcome::NotFound {
        out.push(Annotation::new(
            Severity::Warning,
            "Transaction not found",
            format!("Tracked label `{}` does not appear in the result log", verdict.tracked_label),
        ));
    }
    if malformed_fields > 0 {
        out.push(Annotation::new(
            Severity::Warning,
            "Malformed samples",
            format!("{malformed_fields} numeric field(s) could not be parsed and were defaulted"),
        ));
    }

    if verdict.compliant {
        out.push(Annotation::new(
            Severity::Notice,
            "SLA OK",
            format!(
                "{} samples, p95 {:.0}ms, errors {:.2}%",
                verdict.overall.count,
                verdict.overall.p95_ms.unwrap_or_default(),
                verdict.overall.error_rate_pct
            ),
        ));
    }

    out
}

pub fn empty_input_annotation(policy: EmptyInputPolicy) -> Annotation {
    let severity = match policy {
        EmptyInputPolicy::Fail => Severity::Error,
        EmptyInputPolicy::Warn => Severity::Warning,
    };
    Annotation::new(severity, "Empty result log", "The result log contains no samples")
}
