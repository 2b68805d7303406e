//! Router tests for the form server.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use greenteam::prelude::*;
use greenteam_web::{AppState, create_router};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "greenteam-test-boundary";

fn connected(provider: &Arc<MockProvider>, uploads: &Path) -> Router {
    let registry = AgentRegistry::new(provider.clone(), "mock-model");
    let dispatcher = Dispatcher::new(registry, UploadStore::new(uploads, UploadNaming::Random));
    create_router(Arc::new(AppState::with_dispatcher(dispatcher)))
}

fn multipart(fields: &[(&str, &str)], csv: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = csv {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"csv\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/run")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn last_user_message(request: &ChatRequest) -> String {
    request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .and_then(Message::text)
        .unwrap_or_default()
        .to_owned()
}

#[tokio::test]
async fn health_is_ok() {
    let router = create_router(Arc::new(AppState::unconnected("mock-model")));
    let (status, body) = send(router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn index_preselects_route_from_query() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_texts(["unused"]));

    let (status, body) = send(connected(&provider, tmp.path()), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("value=\"Team Coordinator\" checked"));
    assert!(body.contains(default_prompt(&Route::Coordinator)));
    assert!(!body.contains("class=\"banner"));

    let (_, body) = send(
        connected(&provider, tmp.path()),
        get("/?mode=Single+Specialist&specialist=News%20Analyst"),
    )
    .await;
    assert!(body.contains("value=\"Single Specialist\" checked"));
    assert!(body.contains("<option value=\"News Analyst\" selected>"));
    assert!(body.contains(default_prompt(&Route::Specialist(Specialist::News))));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_key_blocks_submission() {
    let router = create_router(Arc::new(AppState::unconnected("mock-model")));

    let (_, page) = send(router.clone(), get("/")).await;
    assert!(page.contains("<div class=\"banner warning\">Missing GROQ_API_KEY."));

    let (status, body) = send(
        router,
        multipart(&[("mode", "Team Coordinator"), ("prompt", "hello")], None),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("Error: Missing GROQ_API_KEY. Add it to your .env and restart."));
    assert!(!body.contains("class=\"result\""));
}

#[tokio::test]
async fn specialist_reply_is_rendered_as_markdown() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_texts([
        "## Lahore\n\n<b>Lahore</b> opened **two** BRT lines. [PMA](https://example.org/brt)\n\n\
         <script>alert(1)</script>\n",
    ]));

    let (status, body) = send(
        connected(&provider, tmp.path()),
        multipart(
            &[
                ("mode", "Single Specialist"),
                ("specialist", "News Analyst"),
                ("city", "Lahore"),
                ("months", "6"),
                ("prompt", "What changed?"),
            ],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<div class=\"reply\">\n<h2>Lahore</h2>"));
    assert!(body.contains("&lt;b&gt;Lahore&lt;/b&gt; opened <strong>two</strong> BRT lines."));
    assert!(body.contains("<a href=\"https://example.org/brt\">PMA</a>"));
    assert!(body.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!body.contains("<b>Lahore</b>"));
    assert!(!body.contains("<script>alert"));
    assert!(body.contains("<summary>Debug context</summary>"));
    assert!(body.contains("&quot;mode&quot;: &quot;Single Specialist&quot;"));
    assert!(body.contains("&quot;months&quot;: 6"));
    assert!(!body.contains("<h3>Delegations</h3>"));

    let sent = provider.requests();
    assert_eq!(sent.len(), 1);
    let prompt = last_user_message(&sent[0]);
    assert!(prompt.starts_with("What changed?\nCity: Lahore\nTime window: last 6 months\n"));
    assert!(prompt.ends_with(SUFFIX));
}

fn data_analysis_upload(csv: &[u8]) -> Request<Body> {
    multipart(
        &[
            ("mode", "Single Specialist"),
            ("specialist", "Data Analysis Agent"),
            ("prompt", "Summarize trends"),
        ],
        Some(("air.csv", csv)),
    )
}

#[tokio::test]
async fn csv_upload_is_referenced_then_removed() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_texts(["PM2.5 fell 12%."]));

    let (status, html) = send(
        connected(&provider, tmp.path()),
        data_analysis_upload(b"date,pm25\n2025-01-01,80\n"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("PM2.5 fell 12%."));

    let prompt = last_user_message(&provider.requests()[0]);
    let referenced = format!("CSV_PATH: {}{}uploaded-", tmp.path().display(), std::path::MAIN_SEPARATOR);
    assert!(prompt.contains(&referenced), "{prompt}");
    assert!(prompt.contains(".csv (read this file if needed)."));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn csv_upload_bytes_are_stored_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_texts(["done"]));
    let registry = AgentRegistry::new(provider.clone(), "mock-model");
    let dispatcher = Dispatcher::new(
        registry,
        UploadStore::new(tmp.path(), UploadNaming::Fixed("uploaded.csv".into())),
    );
    let router = create_router(Arc::new(AppState::with_dispatcher(dispatcher)));
    let csv = b"date,pm25\n2025-01-01,80\n2025-02-01,70\n";

    let (status, _) = send(router, data_analysis_upload(csv)).await;
    assert_eq!(status, StatusCode::OK);

    let stored = tmp.path().join("uploaded.csv");
    assert_eq!(std::fs::read(&stored).unwrap(), csv);
    let prompt = last_user_message(&provider.requests()[0]);
    assert!(prompt.contains(&format!("CSV_PATH: {} (read this file if needed).", stored.display())));
}

#[tokio::test]
async fn empty_file_part_is_not_an_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_texts(["done"]));

    let (status, _) = send(
        connected(&provider, tmp.path()),
        multipart(
            &[("mode", "Team Coordinator"), ("prompt", "go")],
            Some(("", b"")),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn invalid_submissions_are_bad_requests() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::with_texts(["unused"]));

    let cases: [(&[(&str, &str)], Option<(&str, &[u8])>, &str); 4] = [
        (
            &[("mode", "Team Coordinator"), ("prompt", "   ")],
            None,
            "Please enter a prompt.",
        ),
        (
            &[("mode", "Team Coordinator"), ("months", "13"), ("prompt", "go")],
            None,
            "months must be between 1 and 12",
        ),
        (
            &[
                ("mode", "Single Specialist"),
                ("specialist", "Hackernews Team"),
                ("prompt", "go"),
            ],
            None,
            "unknown specialist",
        ),
        (
            &[("mode", "Team Coordinator"), ("prompt", "go")],
            Some(("data.xlsx", b"x")),
            "Error: Upload error",
        ),
    ];

    for (fields, csv, expected) in cases {
        let (status, body) = send(connected(&provider, tmp.path()), multipart(fields, csv)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert!(body.contains(expected), "{expected}");
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn model_failure_is_a_bad_gateway() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::failing(LlmError::rate_limited("groq")));

    let (status, body) = send(
        connected(&provider, tmp.path()),
        multipart(&[("mode", "Team Coordinator"), ("prompt", "go")], None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body.contains("Error: LLM error"));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn coordinator_delegations_are_listed() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = Arc::new(MockProvider::new(vec![
        ChatResponse::from_tool_calls(vec![ToolCall::function(
            "call_1",
            "policy_reviewer",
            r#"{"task":"Summarize Karachi EV policy"}"#,
        )]),
        ChatResponse::from_text("EV policy effective 2025-07."),
        ChatResponse::from_text("Merged summary."),
    ]));

    let (status, body) = send(
        connected(&provider, tmp.path()),
        multipart(
            &[("mode", "Team Coordinator"), ("city", "Karachi"), ("prompt", "Compare policies")],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<div class=\"reply\">\n<p>Merged summary.</p>\n</div>"));
    assert!(body.contains("<h3>Delegations</h3>"));
    assert!(body.contains("<code>policy_reviewer</code>"));
    assert!(body.contains("Summarize Karachi EV policy"));
    assert!(body.contains("EV policy effective 2025-07."));
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn agents_are_listed_as_json() {
    let router = create_router(Arc::new(AppState::unconnected("qwen/qwen3-32b")));
    let (status, body) = send(router, get("/api/agents")).await;
    assert_eq!(status, StatusCode::OK);

    let agents: Value = serde_json::from_str(&body).unwrap();
    let agents = agents.as_array().unwrap();
    assert_eq!(agents.len(), 5);

    assert_eq!(agents[0]["name"], "Team Coordinator");
    assert_eq!(agents[0]["members"].as_array().unwrap().len(), 4);
    assert_eq!(agents[1]["name"], "Data Analysis Agent");
    assert_eq!(agents[1]["tools"], serde_json::json!(["python", "google_search"]));
    assert_eq!(agents[4]["tools"], serde_json::json!(["hackernews", "google_search"]));
    assert!(agents.iter().all(|a| a["model"] == "qwen/qwen3-32b"));
}
