use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_P95_LIMIT_MS: u64 = 250;
pub const DEFAULT_P99_LIMIT_MS: u64 = 500;
pub const DEFAULT_ERROR_RATE_LIMIT_PCT: f64 = 1.0;
pub const DEFAULT_TRACKED_LABEL: &str = "Transaction Controller_Home";
pub const DEFAULT_TOP_N: usize = 5;

/// Error types for SLA gate operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaGateError {
    #[error("Result log contains no samples")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {0}: {1}")]
    HttpError(u16, String),

    #[error("Slack {method} failed: {error}")]
    SlackApi { method: String, error: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Result type for SLA gate operations
pub type Result<T> = std::result::Result<T, SlaGateError>;

/// One row of a JTL result log, as read. Every column other than these four is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub elapsed: Option<String>,
    #[serde(default, rename = "timeStamp")]
    pub time_stamp: Option<String>,
    /// 1-based data row in the source log (header excluded), filled in by the reader.
    #[serde(skip)]
    pub row: Option<usize>,
}

/// A normalized request sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub label: String,
    pub success: bool,
    pub elapsed_ms: u64,
    /// `None` when the log's timestamp could not be parsed; such samples are left out of
    /// window tracking but still count toward every aggregate.
    pub timestamp_ms: Option<u64>,
}

/// Latency and error-rate limits for one scope (overall traffic or the tracked label).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSet {
    pub p95_limit_ms: u64,
    pub p99_limit_ms: u64,
    pub error_rate_limit_pct: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            p95_limit_ms: DEFAULT_P95_LIMIT_MS,
            p99_limit_ms: DEFAULT_P99_LIMIT_MS,
            error_rate_limit_pct: DEFAULT_ERROR_RATE_LIMIT_PCT,
        }
    }
}

impl ThresholdSet {
    pub fn validate(&self) -> Result<()> {
        let pct = self.error_rate_limit_pct;
        if !pct.is_finite() || pct < 0.0 {
            return Err(SlaGateError::InvalidConfig(format!(
                "error_rate_limit_pct must be a non-negative number, got {pct}"
            )));
        }
        Ok(())
    }
}

/// Everything the engine needs for one evaluation. Fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlaConfig {
    pub overall: ThresholdSet,
    pub tracked_label: String,
    pub tracked: ThresholdSet,
    pub top_n: usize,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            overall: ThresholdSet::default(),
            tracked_label: DEFAULT_TRACKED_LABEL.to_string(),
            tracked: ThresholdSet::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl SlaConfig {
    /// Check both threshold sets; returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.overall.validate()?;
        self.tracked.validate()
    }
}
