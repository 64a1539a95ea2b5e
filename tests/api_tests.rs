use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use recipe_builder::{
    api::routes::create_router,
    config::{Config, LlmSettings},
    AppState,
};

const REPLY: &str = "Title\nIngredients\n- salt\nInstructions\n1. cook\nSide dishes: rice";

type Captured = Arc<Mutex<Vec<Value>>>;

async fn spawn_completion_server(status: StatusCode, body: Value) -> (String, Captured) {
    spawn_delayed_completion_server(status, body, Duration::ZERO).await
}

/// Starts an OpenAI-compatible completion endpoint that answers with
/// `status` and `body` after `delay`, recording every request it receives.
async fn spawn_delayed_completion_server(status: StatusCode, body: Value, delay: Duration) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let seen = captured.clone();

    let app = Router::new().route(
        "/chat/completions",
        post(move |Json(payload): Json<Value>| {
            let seen = seen.clone();
            let body = body.clone();
            async move {
                seen.lock().unwrap().push(payload);
                tokio::time::sleep(delay).await;
                (status, Json(body))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), captured)
}

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
}

fn app(base_url: &str, export_dir: &Path) -> Router {
    app_with_timeout(base_url, export_dir, Duration::from_secs(10))
}

fn app_with_timeout(base_url: &str, export_dir: &Path, request_timeout: Duration) -> Router {
    let mut llm = LlmSettings::new("test-key");
    llm.base_url = base_url.to_string();

    let config = Config {
        server_addr: "127.0.0.1:0".parse().unwrap(),
        llm,
        request_timeout,
        export_dir: export_dir.to_path_buf(),
    };
    create_router(AppState::new(config).unwrap())
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec(), content_type)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let (status, bytes, _) = send(app, Method::POST, uri, Some(body)).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[tokio::test]
async fn test_generate_recipe_end_to_end() {
    let (base_url, captured) =
        spawn_completion_server(StatusCode::OK, completion_body(&format!("\n  {}  \n", REPLY))).await;
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app(&base_url, export_dir.path()),
        "/api/recipe",
        json!({
            "craving": "fried chicken",
            "dietary": ["Vegan", "Keto"],
            "prep_time": 25,
            "cook_time": 60,
            "language": "English"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");

    let data = &body["data"];
    assert_eq!(data["recipe_markdown"], REPLY);
    assert_eq!(data["sections"]["title"], "Title");
    assert_eq!(data["sections"]["ingredients"], "- salt");
    assert_eq!(data["sections"]["instructions"], "1. cook");
    assert_eq!(data["sections"]["side_dishes"], "rice");
    assert_eq!(data["document"]["file_name"], "recipe.pdf");
    assert_eq!(data["document"]["page_count"], 1);
    assert_eq!(data["document"]["replaced_chars"], 0);
    let pdf = STANDARD
        .decode(data["document"]["content_base64"].as_str().unwrap())
        .unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert!(data["recipe_html"].as_str().unwrap().starts_with("<p>Title"));

    let whatsapp = data["share_links"]["whatsapp"].as_str().unwrap();
    let encoded = whatsapp.strip_prefix("https://wa.me/?text=").unwrap();
    assert_eq!(urlencoding::decode(encoded).unwrap(), REPLY);
    assert!(data["share_links"]["email"].as_str().unwrap().starts_with("mailto:?subject=Recipe&body="));

    // The per-request export file does not outlive the request.
    assert!(dir_is_empty(export_dir.path()));

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent["model"], "gpt-4o-mini");
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["role"], "user");
    let user = sent["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains("fried chicken"));
    assert!(user.contains("Vegan, Keto"));
    assert!(user.contains("25"));
    assert!(user.contains("60"));
}

#[tokio::test]
async fn test_plain_text_share_mode_strips_markdown() {
    let reply = "# **Tacos**\n- tortillas";
    let (base_url, _) = spawn_completion_server(StatusCode::OK, completion_body(reply)).await;
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app(&base_url, export_dir.path()),
        "/api/recipe",
        json!({ "craving": "tacos", "share_mode": "plain_text", "export_style": "sectioned" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let twitter = body["data"]["share_links"]["twitter"].as_str().unwrap();
    let encoded = twitter.strip_prefix("https://twitter.com/intent/tweet?text=").unwrap();
    assert_eq!(urlencoding::decode(encoded).unwrap(), "Tacos\n- tortillas");
    assert_eq!(body["data"]["recipe_markdown"], reply);

    let html = body["data"]["recipe_html"].as_str().unwrap();
    assert!(html.contains("<h1><strong>Tacos</strong></h1>"));
    assert!(html.contains("<li>tortillas</li>"));
}

#[tokio::test]
async fn test_empty_craving_is_a_warning_without_a_call() {
    let (base_url, captured) = spawn_completion_server(StatusCode::OK, completion_body(REPLY)).await;
    let export_dir = tempfile::tempdir().unwrap();

    for craving in ["", "   \t"] {
        let (status, body) = post_json(
            app(&base_url, export_dir.path()),
            "/api/recipe",
            json!({ "craving": craving }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["meta"]["status"], "warning");
        assert_eq!(body["meta"]["message"], "Please type something you're craving.");
        assert!(body["data"].is_null());
    }

    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_slider_is_rejected() {
    let (base_url, captured) = spawn_completion_server(StatusCode::OK, completion_body(REPLY)).await;
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app(&base_url, export_dir.path()),
        "/api/recipe",
        json!({ "craving": "pasta", "cook_time": 500 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["meta"]["status"], "error");
    assert!(captured.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_completion_failure_produces_no_artifacts() {
    let (base_url, captured) = spawn_completion_server(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "Rate limit reached" } }),
    )
    .await;
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app(&base_url, export_dir.path()),
        "/api/recipe",
        json!({ "craving": "sushi" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["meta"]["status"], "error");
    let message = body["meta"]["message"].as_str().unwrap();
    assert!(message.starts_with("Error: "));
    assert!(message.contains("Rate limit reached"));
    assert!(body["data"].is_null());
    assert!(dir_is_empty(export_dir.path()));
    assert_eq!(captured.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_completion_reply_is_an_error() {
    let (base_url, _) = spawn_completion_server(StatusCode::OK, json!({ "choices": [] })).await;
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app(&base_url, export_dir.path()),
        "/api/recipe",
        json!({ "craving": "curry" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["meta"]["message"].as_str().unwrap().contains("Invalid response format"));
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_slow_completion_hits_the_request_timeout() {
    let (base_url, _) = spawn_delayed_completion_server(
        StatusCode::OK,
        completion_body(REPLY),
        Duration::from_secs(2),
    )
    .await;
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app_with_timeout(&base_url, export_dir.path(), Duration::from_millis(50)),
        "/api/recipe",
        json!({ "craving": "risotto" }),
    )
    .await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["meta"]["status"], "error");
    assert_eq!(body["meta"]["message"], "Error: Request processing timed out");
    assert!(body["data"].is_null());
    assert!(dir_is_empty(export_dir.path()));
}

#[tokio::test]
async fn test_unreachable_completion_service_is_an_error() {
    let export_dir = tempfile::tempdir().unwrap();

    let (status, body) = post_json(
        app("http://127.0.0.1:1", export_dir.path()),
        "/api/recipe",
        json!({ "craving": "burger" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["data"].is_null());
    assert!(dir_is_empty(export_dir.path()));
}

#[tokio::test]
async fn test_pdf_download() {
    let export_dir = tempfile::tempdir().unwrap();
    let router = app("http://127.0.0.1:1", export_dir.path());

    let (status, bytes, content_type) = send(
        router.clone(),
        Method::POST,
        "/api/recipe/pdf",
        Some(json!({ "recipe": REPLY, "export_style": "sectioned" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/pdf"));
    assert!(bytes.starts_with(b"%PDF"));
    assert!(dir_is_empty(export_dir.path()));

    let (status, body) = post_json(router, "/api/recipe/pdf", json!({ "recipe": "  " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().starts_with("Error: "));
}

#[tokio::test]
async fn test_options_and_index() {
    let export_dir = tempfile::tempdir().unwrap();
    let router = app("http://127.0.0.1:1", export_dir.path());

    let (status, bytes, _) = send(router.clone(), Method::GET, "/api/options", None).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let data = &body["data"];
    assert_eq!(data["dietary_tags"], json!(["Vegan", "Vegetarian", "Gluten-Free", "Keto", "Low-Carb"]));
    assert_eq!(data["languages"], json!(["English", "Spanish", "French", "German", "Italian"]));
    assert_eq!(data["prep_time"], json!({ "min": 5, "max": 120, "default": 30 }));
    assert_eq!(data["cook_time"], json!({ "min": 5, "max": 180, "default": 45 }));

    let (status, bytes, content_type) = send(router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(String::from_utf8(bytes).unwrap().contains("Get Recipe"));
}
