//! Integration tests: start, poll until done, artifact mount, error mapping.

use archviz_api::server::{self, AppState};
use archviz_poller::VideoJobPoller;
use archviz_remote::{CountingFetcher, MockOperationClient};
use archviz_store::{artifact_filename, FsArtifactStore};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    client: Arc<MockOperationClient>,
    fetcher: Arc<CountingFetcher>,
    dir: tempfile::TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = FsArtifactStore::new(dir.path()).await.unwrap();
    let client = Arc::new(MockOperationClient::new());
    let fetcher = Arc::new(CountingFetcher::new("fake-mp4-bytes"));
    let poller = VideoJobPoller::new(Arc::clone(&client), Arc::clone(&fetcher), store);
    let state = Arc::new(AppState {
        poller: Arc::new(poller),
        artifact_root: dir.path().to_path_buf(),
    });
    TestApp {
        app: server::router(state),
        client,
        fetcher,
        dir,
    }
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn start_poll_done_and_serve_artifact() {
    let t = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/jobs")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "prompt": "cantilevered concrete house over a lake", "aspectRatio": "16:9" })
                .to_string(),
        ))
        .unwrap();
    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    let j: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(j["status"], "running");
    let job_id = j["jobId"].as_str().unwrap().to_string();

    let (status, j) = get_json(&t.app, &format!("/jobs/{}", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j, json!({ "jobId": job_id, "status": "running" }));

    t.client.complete(&job_id, "https://upstream/files/abc:download");
    let (status, j) = get_json(&t.app, &format!("/jobs/{}", job_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["status"], "done");
    let video_url = j["videoUrl"].as_str().unwrap().to_string();
    assert_eq!(video_url, format!("/videos/{}", artifact_filename(&job_id)));

    let req = Request::builder()
        .method("GET")
        .uri(video_url.as_str())
        .body(Body::empty())
        .unwrap();
    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"fake-mp4-bytes");
}

#[tokio::test]
async fn repolling_ready_job_never_redownloads() {
    let t = test_app().await;
    let job = "models/veo/operations/ready1";
    t.client.complete(job, "https://upstream/files/r1");
    std::fs::write(t.dir.path().join(artifact_filename(job)), b"cached").unwrap();
    for _ in 0..3 {
        let (status, j) = get_json(&t.app, &format!("/jobs/{}", job)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(j["status"], "done");
    }
    assert_eq!(t.fetcher.calls(), 0);
}

#[tokio::test]
async fn failed_download_reports_running() {
    let t = test_app().await;
    let job = "models/veo/operations/flaky";
    t.client.complete(job, "https://upstream/files/flaky");
    t.fetcher.set_failing(true);
    let (status, j) = get_json(&t.app, &format!("/jobs/{}", job)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(j["status"], "running");
    assert!(j.get("videoUrl").is_none());
}

#[tokio::test]
async fn upstream_error_is_bad_gateway_with_diagnostics() {
    let t = test_app().await;
    let job = "models/veo/operations/broken";
    t.client.set_status(job, 500, "internal upstream failure");
    let (status, j) = get_json(&t.app, &format!("/jobs/{}", job)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(j["upstreamStatus"], 500);
    assert_eq!(j["upstreamBody"], "internal upstream failure");
}

#[tokio::test]
async fn unparseable_done_payload_is_distinct_error() {
    let t = test_app().await;
    let job = "models/veo/operations/drift";
    t.client
        .set_body(job, json!({ "done": true, "response": {} }));
    let (status, j) = get_json(&t.app, &format!("/jobs/{}", job)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(j["message"]
        .as_str()
        .unwrap()
        .starts_with("unexpected upstream payload"));
    assert_eq!(t.fetcher.calls(), 0);
}

#[tokio::test]
async fn invalid_job_id_is_bad_request() {
    let t = test_app().await;
    let (status, j) = get_json(&t.app, "/jobs/ops%20x").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(j["code"], 400);
    assert_eq!(t.client.check_count(), 0);
}

#[tokio::test]
async fn blank_prompt_is_bad_request() {
    let t = test_app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/jobs")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "prompt": "" }).to_string()))
        .unwrap();
    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health() {
    let t = test_app().await;
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let res = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"ok");
}
