use mockito::Matcher;
use slagate_common::SlaGateError;
use slagate_slack::{PostedMessage, SlackClient, SlackConfig, DEFAULT_API_BASE};

// Helper: a client whose API base points at the given mockito server.
fn client_for(server_url: &str) -> SlackClient {
    SlackClient::new(SlackConfig { token: "xoxb-test".to_string(), api_base: server_url.to_string() })
}

#[test]
fn test_config_defaults_to_public_api() {
    let config = SlackConfig::new("xoxb-1");
    assert_eq!(config.token, "xoxb-1");
    assert_eq!(config.api_base, DEFAULT_API_BASE);
}

#[test]
fn test_build_method_url() {
    let client = SlackClient::new(SlackConfig::new("t"));
    assert_eq!(client.build_method_url("chat.postMessage"), "https://slack.com/api/chat.postMessage");
}

#[test]
fn test_build_method_url_trims_trailing_slash() {
    let client = SlackClient::new(SlackConfig { token: "t".to_string(), api_base: "http://localhost:9000/api/".to_string() });
    assert_eq!(client.build_method_url("files.completeUploadExternal"), "http://localhost:9000/api/files.completeUploadExternal");
}

// --- chat.postMessage ---

#[tokio::test]
async fn test_post_message_sends_auth_and_form() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat.postMessage")
        .match_header("authorization", "Bearer xoxb-test")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("channel".into(), "C123".into()),
            Matcher::UrlEncoded("text".into(), "✅ *SLA OK*".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"channel":"C123","ts":"1700000000.000100"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let posted = client.post_message("C123", "✅ *SLA OK*", None).await.unwrap();

    assert_eq!(posted, PostedMessage { channel: "C123".to_string(), ts: "1700000000.000100".to_string() });
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_message_in_thread() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::UrlEncoded("thread_ts".into(), "111.222".into()))
        .with_status(200)
        .with_body(r#"{"ok":true,"channel":"C1","ts":"111.333"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let posted = client.post_message("C1", "reply", Some("111.222")).await.unwrap();
    assert_eq!(posted.ts, "111.333");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_post_message_not_ok_maps_to_slack_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat.postMessage")
        .with_status(200)
        .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client.post_message("CXXX", "hi", None).await;
    assert_eq!(
        result,
        Err(SlaGateError::SlackApi {
            method: "chat.postMessage".to_string(),
            error: "channel_not_found".to_string(),
        })
    );
}

#[tokio::test]
async fn test_non_json_response_maps_to_http_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat.postMessage")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client.post_message("C1", "hi", None).await;
    assert_eq!(result, Err(SlaGateError::HttpError(502, "Bad Gateway".to_string())));
}

#[tokio::test]
async fn test_post_message_missing_ts_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat.postMessage")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    assert!(matches!(
        client.post_message("C1", "hi", None).await,
        Err(SlaGateError::SlackApi { method, .. }) if method == "chat.postMessage"
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = client_for("http://127.0.0.1:1");
    assert!(matches!(client.post_message("C1", "hi", None).await, Err(SlaGateError::NetworkError(_))));
}

// --- external upload ---

#[tokio::test]
async fn test_upload_bytes_runs_all_three_steps() {
    let mut server = mockito::Server::new_async().await;
    let upload_url = format!("{}/upload/F42", server.url());

    let reserve = server
        .mock("POST", "/files.getUploadURLExternal")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filename".into(), "p95.png".into()),
            Matcher::UrlEncoded("length".into(), "4".into()),
        ]))
        .with_status(200)
        .with_body(format!(r#"{{"ok":true,"upload_url":"{upload_url}","file_id":"F42"}}"#))
        .create_async()
        .await;
    let push = server
        .mock("POST", "/upload/F42")
        .with_status(200)
        .create_async()
        .await;
    let complete = server
        .mock("POST", "/files.completeUploadExternal")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("files".into(), r#"[{"id":"F42","title":"p95"}]"#.into()),
            Matcher::UrlEncoded("channel_id".into(), "C9".into()),
            Matcher::UrlEncoded("thread_ts".into(), "1.2".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let file_id = client
        .upload_bytes("C9", "p95.png", b"\x89PNG".to_vec(), "p95", Some("1.2"))
        .await
        .unwrap();

    assert_eq!(file_id, "F42");
    reserve.assert_async().await;
    push.assert_async().await;
    complete.assert_async().await;
}

#[tokio::test]
async fn test_upload_push_failure_skips_completion() {
    let mut server = mockito::Server::new_async().await;
    let upload_url = format!("{}/upload/F1", server.url());

    server
        .mock("POST", "/files.getUploadURLExternal")
        .with_status(200)
        .with_body(format!(r#"{{"ok":true,"upload_url":"{upload_url}","file_id":"F1"}}"#))
        .create_async()
        .await;
    server
        .mock("POST", "/upload/F1")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    let complete = server
        .mock("POST", "/files.completeUploadExternal")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client.upload_bytes("C1", "a.zip", vec![1, 2, 3], "a", None).await;
    assert_eq!(result, Err(SlaGateError::HttpError(500, "boom".to_string())));
    complete.assert_async().await;
}

#[tokio::test]
async fn test_upload_reserve_rejected() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/files.getUploadURLExternal")
        .with_status(200)
        .with_body(r#"{"ok":false,"error":"not_authed"}"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client.upload_bytes("C1", "a.png", vec![0], "a", None).await;
    assert!(matches!(result, Err(SlaGateError::SlackApi { error, .. }) if error == "not_authed"));
}

#[tokio::test]
async fn test_upload_file_missing_path_is_io_error() {
    let client = client_for("http://127.0.0.1:1");
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.png");
    assert!(matches!(
        client.upload_file("C1", &missing, "nope", None).await,
        Err(SlaGateError::Io(_))
    ));
}

#[tokio::test]
async fn test_upload_file_reads_from_disk() {
    let mut server = mockito::Server::new_async().await;
    let upload_url = format!("{}/upload/F7", server.url());
    server
        .mock("POST", "/files.getUploadURLExternal")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("filename".into(), "panel.png".into()),
            Matcher::UrlEncoded("length".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(format!(r#"{{"ok":true,"upload_url":"{upload_url}","file_id":"F7"}}"#))
        .create_async()
        .await;
    server.mock("POST", "/upload/F7").with_status(204).create_async().await;
    server
        .mock("POST", "/files.completeUploadExternal")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.png");
    std::fs::write(&path, b"hello").unwrap();

    let client = client_for(&server.url());
    assert_eq!(client.upload_file("C1", &path, "panel", None).await.unwrap(), "F7");
}
