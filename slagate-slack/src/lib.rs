use serde::{Deserialize, Serialize};
use slagate_common::{Result, SlaGateError};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Timeout for Web API method calls.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for pushing file bytes to an upload URL.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Slack client configuration
#[derive(Debug, Clone)]
pub struct SlackConfig {
    /// Bot token, sent as `Authorization: Bearer <token>`.
    pub token: String,
    /// Web API base URL without a trailing slash. Defaults to [`DEFAULT_API_BASE`].
    pub api_base: String,
}

impl SlackConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), api_base: DEFAULT_API_BASE.to_string() }
    }
}

/// A message accepted by `chat.postMessage`. `ts` doubles as the thread id for replies.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub channel: String,
    pub ts: String,
}

/// The subset of Slack's response envelope this client reads.
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
    channel: Option<String>,
    ts: Option<String>,
    upload_url: Option<String>,
    file_id: Option<String>,
}

#[derive(Serialize)]
struct FileRef<'a> {
    id: &'a str,
    title: &'a str,
}

/// Slack Web API client
pub struct SlackClient {
    pub config: SlackConfig,
    http_client: reqwest::Client,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Self {
        Self { config, http_client: reqwest::Client::new() }
    }

    /// Build the URL for a Web API method, e.g. `chat.postMessage`.
    pub fn build_method_url(&self, method: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), method)
    }

    /// Post `text` to `channel`, as a thread reply when `thread_ts` is given.
    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<PostedMessage> {
        let mut form = vec![("channel", channel.to_string()), ("text", text.to_string())];
        if let Some(ts) = thread_ts {
            form.push(("thread_ts", ts.to_string()));
        }

        let response = self.call("chat.postMessage", &form).await?;
        let ts = response.ts.ok_or_else(|| missing_field("chat.postMessage", "ts"))?;
        let channel = response.channel.unwrap_or_else(|| channel.to_string());
        info!(%channel, %ts, "posted Slack message");
        Ok(PostedMessage { channel, ts })
    }

    /// Upload the file at `path` and share it in `channel`. Returns the Slack file id.
    pub async fn upload_file(
        &self,
        channel: &str,
        path: &Path,
        title: &str,
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SlaGateError::InvalidPath(path.display().to_string()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SlaGateError::Io(format!("{}: {e}", path.display())))?;
        self.upload_bytes(channel, &filename, bytes, title, thread_ts).await
    }

    /// External upload flow: reserve an upload URL, push the bytes, then complete the
    /// upload into `channel` (and `thread_ts`, if any).
    pub async fn upload_bytes(
        &self,
        channel: &str,
        filename: &str,
        bytes: Vec<u8>,
        title: &str,
        thread_ts: Option<&str>,
    ) -> Result<String> {
        let reserve = self
            .call(
                "files.getUploadURLExternal",
                &[("filename", filename.to_string()), ("length", bytes.len().to_string())],
            )
            .await?;
        let upload_url = reserve
            .upload_url
            .ok_or_else(|| missing_field("files.getUploadURLExternal", "upload_url"))?;
        let file_id = reserve
            .file_id
            .ok_or_else(|| missing_field("files.getUploadURLExternal", "file_id"))?;
        debug!(%file_id, %filename, size = bytes.len(), "reserved upload URL");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let upload = self
            .http_client
            .post(&upload_url)
            .multipart(reqwest::multipart::Form::new().part("file", part))
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| SlaGateError::NetworkError(e.to_string()))?;

        let status = upload.status();
        if !matches!(status.as_u16(), 200 | 201 | 204) {
            let body = upload.text().await.unwrap_or_default();
            return Err(SlaGateError::HttpError(status.as_u16(), body));
        }

        let files = serde_json::to_string(&[FileRef { id: &file_id, title }])
            .map_err(|e| SlaGateError::InvalidConfig(e.to_string()))?;
        let mut form = vec![("files", files), ("channel_id", channel.to_string())];
        if let Some(ts) = thread_ts {
            form.push(("thread_ts", ts.to_string()));
        }
        self.call("files.completeUploadExternal", &form).await?;

        info!(%file_id, %filename, "uploaded file to Slack");
        Ok(file_id)
    }

    async fn call(&self, method: &str, form: &[(&str, String)]) -> Result<SlackResponse> {
        let response = self
            .http_client
            .post(self.build_method_url(method))
            .bearer_auth(&self.config.token)
            .form(form)
            .timeout(API_TIMEOUT)
            .send()
            .await
            .map_err(|e| SlaGateError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SlaGateError::NetworkError(e.to_string()))?;

        let parsed: SlackResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) => return Err(SlaGateError::HttpError(status.as_u16(), body)),
        };

        if !parsed.ok {
            return Err(SlaGateError::SlackApi {
                method: method.to_string(),
                error: parsed.error.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }
        Ok(parsed)
    }
}

fn missing_field(method: &str, field: &str) -> SlaGateError {
    SlaGateError::SlackApi {
        method: method.to_string(),
        error: format!("response missing {field}"),
    }
}
