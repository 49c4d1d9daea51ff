//! Integration tests for the TikTok mirror source against a mock API
//!
//! Run with: cargo test --test mirror_test

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clipferry::download::{DownloadError, DownloadRequest, DownloadSource, MirrorSource};

const TIKTOK_URL: &str = "https://www.tiktok.com/@user/video/7300000000000000000";

async fn mount_api(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("url", TIKTOK_URL))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mirror_downloads_play_url() {
    let server = MockServer::start().await;
    mount_api(
        &server,
        json!({ "code": 0, "msg": "success", "data": { "play": format!("{}/media/v.mp4", server.uri()) } }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/media/v.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 20_000]))
        .mount(&server)
        .await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::new(server.uri()).unwrap();
    let fetched = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap();

    assert_eq!(fetched.path, scratch.path().join("tiktok_video.mp4"));
    assert_eq!(fetched.title, "TikTok Video");
    assert_eq!(std::fs::metadata(&fetched.path).unwrap().len(), 20_000);
}

#[tokio::test]
async fn test_mirror_joins_relative_play_path() {
    let server = MockServer::start().await;
    mount_api(&server, json!({ "code": 0, "data": { "play": "/video/media/play/abc.mp4" } })).await;
    Mock::given(method("GET"))
        .and(path("/video/media/play/abc.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip".to_vec()))
        .mount(&server)
        .await;

    let scratch = TempDir::new().unwrap();
    // Trailing slash on the base is trimmed
    let source = MirrorSource::new(format!("{}/", server.uri())).unwrap();
    let fetched = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap();

    assert_eq!(std::fs::read(&fetched.path).unwrap(), b"clip");
}

#[tokio::test]
async fn test_mirror_rejects_non_zero_code() {
    let server = MockServer::start().await;
    mount_api(&server, json!({ "code": -1, "msg": "Url parsing is failed!" })).await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::new(server.uri()).unwrap();
    let err = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Mirror(_)));
    assert!(err.to_string().contains("Url parsing is failed!"));
    assert!(!scratch.path().join("tiktok_video.mp4").exists());
}

#[tokio::test]
async fn test_mirror_rejects_missing_play_field() {
    let server = MockServer::start().await;
    mount_api(&server, json!({ "code": 0, "data": { "title": "no play here" } })).await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::new(server.uri()).unwrap();
    let err = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Mirror(_)));
}

#[tokio::test]
async fn test_mirror_api_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::new(server.uri()).unwrap();
    let err = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::MirrorStatus(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn test_mirror_media_http_error() {
    let server = MockServer::start().await;
    mount_api(&server, json!({ "code": 0, "data": { "play": "/gone.mp4" } })).await;
    Mock::given(method("GET"))
        .and(path("/gone.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::new(server.uri()).unwrap();
    let err = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Mirror download failed with HTTP 404 Not Found");
}

#[tokio::test]
async fn test_mirror_empty_body_is_failure() {
    let server = MockServer::start().await;
    mount_api(&server, json!({ "code": 0, "data": { "play": "/empty.mp4" } })).await;
    Mock::given(method("GET"))
        .and(path("/empty.mp4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::new(server.uri()).unwrap();
    let err = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Mirror(_)));
}

/// Serves one media response whose body arrives as `chunks` pieces of
/// `chunk_len` bytes with `gap` between them. Returns the media URL.
async fn trickle_server(chunks: usize, chunk_len: usize, gap: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            chunks * chunk_len
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        for _ in 0..chunks {
            tokio::time::sleep(gap).await;
            if socket.write_all(&vec![5u8; chunk_len]).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }
    });

    format!("http://{}/media/slow.mp4", addr)
}

#[tokio::test]
async fn test_mirror_steady_stream_outlasts_timeout() {
    let server = MockServer::start().await;
    // 6 chunks 300 ms apart: about 1.8 s in total against a 1 s timeout
    let media_url = trickle_server(6, 1000, Duration::from_millis(300)).await;
    mount_api(&server, json!({ "code": 0, "data": { "play": media_url } })).await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::with_timeout(server.uri(), Duration::from_secs(1)).unwrap();
    let started = Instant::now();
    let fetched = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap();

    assert!(started.elapsed() > Duration::from_secs(1));
    assert_eq!(std::fs::metadata(&fetched.path).unwrap().len(), 6000);
}

#[tokio::test]
async fn test_mirror_stalled_stream_times_out() {
    let server = MockServer::start().await;
    // First chunk arrives only after 3 s, well past the 500 ms read timeout
    let media_url = trickle_server(2, 1000, Duration::from_secs(3)).await;
    mount_api(&server, json!({ "code": 0, "data": { "play": media_url } })).await;

    let scratch = TempDir::new().unwrap();
    let source = MirrorSource::with_timeout(server.uri(), Duration::from_millis(500)).unwrap();
    let err = source
        .fetch(&DownloadRequest::new(TIKTOK_URL, false), scratch.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Mirror(_)));
}

#[test]
fn test_mirror_claims_tiktok_only() {
    let source = MirrorSource::new("http://127.0.0.1:9").unwrap();
    assert!(source.supports_url("https://vm.TikTok.com/xyz"));
    assert!(!source.supports_url("https://youtu.be/abc123"));
}
