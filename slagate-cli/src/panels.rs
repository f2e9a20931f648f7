use slagate_common::{Result, SlaGateError};
use slagate_slack::SlackClient;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{EXIT_PANELS_USAGE, EXIT_PANELS_WRONG_KIND};

/// What `upload-panels` will send into the thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelSource {
    Zip(PathBuf),
    /// Every `*.png` in a folder, sorted by path. May be empty.
    Folder(Vec<PathBuf>),
}

#[derive(Debug, Error, PartialEq)]
pub enum PanelPathError {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("--zip expects a file path (e.g. panels.zip): {0}")]
    ExpectedFile(String),

    #[error("expected a folder of PNGs (or use --zip for a file): {0}")]
    ExpectedFolder(String),

    #[error("cannot list {0}: {1}")]
    Unreadable(String, String),
}

impl PanelPathError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PanelPathError::NotFound(_) | PanelPathError::Unreadable(..) => EXIT_PANELS_USAGE,
            PanelPathError::ExpectedFile(_) | PanelPathError::ExpectedFolder(_) => EXIT_PANELS_WRONG_KIND,
        }
    }
}

/// Decide what to upload from `path`, checking it matches the `--zip` mode.
pub fn resolve(path: &Path, zip: bool) -> std::result::Result<PanelSource, PanelPathError> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(PanelPathError::NotFound(shown));
    }
    match (zip, path.is_file()) {
        (true, true) => Ok(PanelSource::Zip(path.to_path_buf())),
        (true, false) => Err(PanelPathError::ExpectedFile(shown)),
        (false, true) => Err(PanelPathError::ExpectedFolder(shown)),
        (false, false) => collect_pngs(path)
            .map(PanelSource::Folder)
            .map_err(|e| PanelPathError::Unreadable(shown, e.to_string())),
    }
}

/// `*.png` files directly inside `dir`, sorted. The extension match is case-sensitive.
pub fn collect_pngs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "png") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Title shown in Slack for an uploaded file: its name without the extension.
pub fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct UploadSummary {
    pub uploaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, SlaGateError)>,
}

/// Upload a folder's PNGs one at a time into `thread_ts`. One file failing does not stop
/// the rest.
pub async fn upload_folder(
    client: &SlackClient,
    channel: &str,
    files: &[PathBuf],
    thread_ts: &str,
) -> UploadSummary {
    let mut summary = UploadSummary::default();
    for file in files {
        match client.upload_file(channel, file, &title_for(file), Some(thread_ts)).await {
            Ok(file_id) => {
                info!(file = %file.display(), %file_id, "uploaded panel");
                summary.uploaded.push(file.clone());
            }
            Err(e) => {
                warn!(file = %file.display(), error = %e, "panel upload failed");
                summary.failed.push((file.clone(), e));
            }
        }
    }
    summary
}

/// Upload a single ZIP into `thread_ts`.
pub async fn upload_zip(client: &SlackClient, channel: &str, zip: &Path, thread_ts: &str) -> Result<String> {
    client.upload_file(channel, zip, &title_for(zip), Some(thread_ts)).await
}
