use std::{
    net::TcpListener as StdTcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;
use tokio::net::TcpListener;
use vidintel_core::{
    BackendConfig, HttpBackend, SessionController, SessionEvent, SessionStatus, VideoBackend,
    VideoFile, VidintelError, format_score, format_time_label,
};

#[derive(Debug, Clone)]
struct SeenField {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

type Seen = Arc<Mutex<Vec<SeenField>>>;

async fn record(seen: &Seen, mut multipart: Multipart) {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await.unwrap().to_vec();
        seen.lock().unwrap().push(SeenField {
            name,
            file_name,
            content_type,
            body,
        });
    }
}

async fn upload_ok(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    Json(json!({"message": "Video processed successfully", "frames_indexed": 3}))
}

async fn search_ok(State(seen): State<Seen>, multipart: Multipart) -> impl IntoResponse {
    record(&seen, multipart).await;
    Json(json!({
        "results": [
            {"timestamp": 5, "score": 0.5},
            {"timestamp": 61.0, "description": "2 person, 1 car", "score": 0.125}
        ]
    }))
}

async fn always_500() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "model crashed")
}

async fn slow_search() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"results": []}))
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn mock_backend(seen: Seen) -> Router {
    Router::new()
        .route("/upload_video", post(upload_ok))
        .route("/search", post(search_ok))
        .with_state(seen)
}

fn backend_at(base_url: String) -> HttpBackend {
    HttpBackend::new(BackendConfig {
        base_url,
        request_timeout: None,
    })
    .unwrap()
}

fn closed_port_url() -> String {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn write_video(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> VideoFile {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    VideoFile::new(path)
}

#[tokio::test]
async fn upload_sends_file_field_with_name_and_bytes() {
    let seen = Seen::default();
    let backend = backend_at(serve(mock_backend(seen.clone())).await);
    let dir = tempfile::tempdir().unwrap();
    let video = write_video(&dir, "street.mp4", b"not really a video");

    let receipt = backend.upload_video(&video).await.unwrap();
    assert_eq!(receipt.frames_indexed, Some(3));

    let fields = seen.lock().unwrap().clone();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "file");
    assert_eq!(fields[0].file_name.as_deref(), Some("street.mp4"));
    assert_eq!(fields[0].content_type.as_deref(), Some("video/mp4"));
    assert_eq!(fields[0].body, b"not really a video");
}

#[tokio::test]
async fn search_sends_query_field_and_keeps_server_order() {
    let seen = Seen::default();
    let backend = backend_at(serve(mock_backend(seen.clone())).await);

    let results = backend.search("when did the car appear?").await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].timestamp, 5.0);
    assert_eq!(results[1].description.as_deref(), Some("2 person, 1 car"));

    let fields = seen.lock().unwrap().clone();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "query");
    assert_eq!(fields[0].body, b"when did the car appear?");
}

#[tokio::test]
async fn non_success_status_is_a_failure() {
    let app = Router::new()
        .route("/upload_video", post(always_500))
        .route("/search", post(always_500));
    let backend = backend_at(serve(app).await);

    let err = backend.search("anything").await.unwrap_err();
    match err {
        VidintelError::BadStatus { endpoint, status } => {
            assert_eq!(endpoint, "/search");
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_video_fails_before_any_request() {
    let seen = Seen::default();
    let backend = backend_at(serve(mock_backend(seen.clone())).await);
    let dir = tempfile::tempdir().unwrap();

    let err = backend
        .upload_video(&VideoFile::new(dir.path().join("gone.mp4")))
        .await
        .unwrap_err();
    assert!(matches!(err, VidintelError::VideoUnreadable { .. }));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn configured_timeout_turns_a_hang_into_a_failure() {
    let app = Router::new().route("/search", post(slow_search));
    let backend = HttpBackend::new(BackendConfig {
        base_url: serve(app).await,
        request_timeout: Some(Duration::from_millis(200)),
    })
    .unwrap();

    let err = backend.search("slow").await.unwrap_err();
    assert!(matches!(err, VidintelError::Timeout { endpoint: "/search", .. }));
}

#[tokio::test]
async fn session_over_http_uploads_then_renders_matches() {
    let seen = Seen::default();
    let backend = backend_at(serve(mock_backend(seen.clone())).await);
    let dir = tempfile::tempdir().unwrap();
    let video = write_video(&dir, "clip.webm", b"frames");

    let mut ctl = SessionController::new(Arc::new(backend));
    ctl.select_file(video);
    ctl.submit_video().unwrap();
    assert_eq!(ctl.settle().await, vec![SessionEvent::UploadSucceeded]);
    assert_eq!(ctl.state().status, SessionStatus::Ready);

    ctl.set_query("a red car");
    ctl.submit_query().unwrap();
    ctl.settle().await;

    let results = &ctl.state().results;
    assert_eq!(format_time_label(&results[0]), "00:05 (5s)");
    assert_eq!(format_score(results[0].score), "0.500");
    assert_eq!(format_time_label(&results[1]), "01:01 (61s)");
    assert!(!ctl.state().show_no_results());
}

#[tokio::test]
async fn unreachable_backend_clears_busy_with_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let video = write_video(&dir, "clip.mp4", b"frames");

    let mut ctl = SessionController::new(Arc::new(backend_at(closed_port_url())));
    ctl.select_file(video.clone());
    ctl.submit_video().unwrap();
    assert!(ctl.state().busy);

    assert_eq!(ctl.next_event().await, Some(SessionEvent::UploadFailed));
    assert!(!ctl.state().busy);
    assert_eq!(ctl.state().status, SessionStatus::UploadError);
    assert_eq!(ctl.state().file, Some(video));

    ctl.set_query("anything");
    ctl.submit_query().unwrap();
    assert_eq!(ctl.next_event().await, Some(SessionEvent::SearchFailed));
    assert!(ctl.state().results.is_empty());
    assert!(ctl.state().show_no_results());
}
