use clap::ValueEnum;
use slagate_common::{Result, SlaConfig, SlaGateError};
use std::path::Path;

/// `check`: compliant, or breached without `--fail-on-breach`, or empty input under `warn`.
pub const EXIT_OK: i32 = 0;
/// `check`: the result log had no samples and the empty-input policy is `fail`.
pub const EXIT_EMPTY_INPUT: i32 = 1;
/// `check`: at least one SLA rule was breached and `--fail-on-breach` was given.
pub const EXIT_BREACH: i32 = 2;
/// `check`: the run could not complete (unreadable log, bad config, Slack failure).
pub const EXIT_FAILURE: i32 = 3;

/// `upload-panels`: missing path or missing Slack credentials.
pub const EXIT_PANELS_USAGE: i32 = 1;
/// `upload-panels`: the parent message could not be posted.
pub const EXIT_PANELS_MESSAGE_FAILED: i32 = 2;
/// `upload-panels`: a file was given without `--zip`, or a folder with it.
pub const EXIT_PANELS_WRONG_KIND: i32 = 3;
/// `upload-panels`: the ZIP upload failed.
pub const EXIT_PANELS_ZIP_FAILED: i32 = 4;

/// Report timestamps in IST (UTC+05:30) unless told otherwise.
pub const DEFAULT_DISPLAY_OFFSET_MINUTES: i32 = 330;

pub const DEFAULT_TEST_NAME: &str = "Performance Test";

/// What an empty result log means for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmptyInputPolicy {
    /// Report it and exit with [`EXIT_EMPTY_INPUT`].
    Fail,
    /// Report it and exit with [`EXIT_OK`].
    Warn,
}

/// Read an `SlaConfig` from a JSON file, or start from defaults when no file is given.
/// Fields absent from the file keep their defaults.
pub fn load_config(path: Option<&Path>) -> Result<SlaConfig> {
    let Some(path) = path else {
        return Ok(SlaConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| SlaGateError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| SlaGateError::InvalidConfig(format!("{}: {e}", path.display())))
}

/// Command-line overrides, applied on top of the file/default config.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub p95_limit_ms: Option<u64>,
    pub p99_limit_ms: Option<u64>,
    pub error_rate_limit_pct: Option<f64>,
    pub tracked_label: Option<String>,
    pub tracked_p95_limit_ms: Option<u64>,
    pub tracked_p99_limit_ms: Option<u64>,
    pub tracked_error_rate_limit_pct: Option<f64>,
    pub top_n: Option<usize>,
}

impl Overrides {
    pub fn apply(self, config: &mut SlaConfig) {
        if let Some(v) = self.p95_limit_ms {
            config.overall.p95_limit_ms = v;
        }
        if let Some(v) = self.p99_limit_ms {
            config.overall.p99_limit_ms = v;
        }
        if let Some(v) = self.error_rate_limit_pct {
            config.overall.error_rate_limit_pct = v;
        }
        if let Some(v) = self.tracked_label {
            config.tracked_label = v;
        }
        if let Some(v) = self.tracked_p95_limit_ms {
            config.tracked.p95_limit_ms = v;
        }
        if let Some(v) = self.tracked_p99_limit_ms {
            config.tracked.p99_limit_ms = v;
        }
        if let Some(v) = self.tracked_error_rate_limit_pct {
            config.tracked.error_rate_limit_pct = v;
        }
        if let Some(v) = self.top_n {
            config.top_n = v;
        }
    }
}

/// Exit code for `check`. `compliant` is `None` when the log was empty.
pub fn check_exit_code(compliant: Option<bool>, fail_on_breach: bool, policy: EmptyInputPolicy) -> i32 {
    match compliant {
        None => match policy {
            EmptyInputPolicy::Fail => EXIT_EMPTY_INPUT,
            EmptyInputPolicy::Warn => EXIT_OK,
        },
        Some(true) => EXIT_OK,
        Some(false) if fail_on_breach => EXIT_BREACH,
        Some(false) => EXIT_OK,
    }
}
