use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use httpmock::prelude::*;
use property_site_publisher::core::HostingApi;
use property_site_publisher::{router, AppConfig, AppState, GitHubClient};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "----site-publisher-test";

fn config(uploads: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.uploads.dir = uploads.path().to_string_lossy().to_string();
    config
}

fn offline_app(uploads: &TempDir) -> Router {
    router(Arc::new(AppState::new(config(uploads), None)))
}

fn hosted_app(uploads: &TempDir, server: &MockServer) -> Router {
    let mut config = config(uploads);
    config.hosting.token = Some("ghp_test".to_string());
    config.hosting.owner = "acme".to_string();
    config.hosting.repo = "listings".to_string();

    let client = GitHubClient::new(server.base_url(), "acme", "listings", "ghp_test").unwrap();
    router(Arc::new(AppState::new(config, Some(Arc::new(client) as Arc<dyn HostingApi>))))
}

fn complete_submission() -> Value {
    json!({
        "property": {
            "address": "123 Main St",
            "city": "Springfield",
            "state": "IL",
            "zip": "62701",
            "price": 350000,
            "bedrooms": 3,
            "bathrooms": 2
        },
        "realtor": {"name": "Jane Agent", "phone": "555-0100", "email": "jane@example.com"},
        "loanOfficer": {"name": "Larry Lender", "phone": "555-0200", "email": "larry@example.com", "nmls": "123456"}
    })
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

fn multipart_request(files: &[(&str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, content_type, data) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"photos\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, body))
}

fn upload_count(uploads: &TempDir) -> usize {
    std::fs::read_dir(uploads.path()).map(|dir| dir.count()).unwrap_or(0)
}

#[tokio::test]
async fn test_config_reports_unconfigured_hosting() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let (status, body) = send(offline_app(&uploads), empty_request("GET", "/api/config")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], json!(false));
    assert!(body.get("pagesUrl").is_none());
    Ok(())
}

#[tokio::test]
async fn test_generate_without_hosting_returns_html() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let (status, body) = send(
        offline_app(&uploads),
        json_request("POST", "/api/generate", &complete_submission()),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["published"], json!(false));
    assert_eq!(body["slug"], json!("123-main-st-springfield"));
    let html = body["html"].as_str().unwrap_or_default();
    assert!(html.contains("123 Main St"));
    assert!(html.contains("$350,000"));
    assert!(html.contains("NMLS"));
    Ok(())
}

#[tokio::test]
async fn test_generate_reports_missing_fields() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let mut submission = complete_submission();
    submission["property"]["zip"] = json!("");
    if let Some(officer) = submission["loanOfficer"].as_object_mut() {
        officer.remove("email");
    }

    let (status, body) = send(offline_app(&uploads), json_request("POST", "/api/generate", &submission)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    let missing: Vec<&str> = body["missingFields"]
        .as_array()
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    assert_eq!(missing, vec!["property.zip", "loanOfficer.email"]);
    Ok(())
}

#[tokio::test]
async fn test_preview_fills_placeholders_and_escapes_input() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let submission = json!({
        "property": {"address": "<script>alert(1)</script>", "description": "Sunny & bright"}
    });

    let (status, body) = send(offline_app(&uploads), json_request("POST", "/api/preview", &submission)).await?;

    assert_eq!(status, StatusCode::OK);
    let html = body["html"].as_str().unwrap_or_default();
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("Sunny &amp; bright"));
    Ok(())
}

#[tokio::test]
async fn test_upload_stores_images() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let request = multipart_request(&[("front.JPG", "image/jpeg", b"jpeg"), ("yard.png", "image/png", b"png")]);

    let (status, body) = send(offline_app(&uploads), request).await?;

    assert_eq!(status, StatusCode::OK);
    let files = body["files"].as_array().cloned().unwrap_or_default();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["originalName"], json!("front.JPG"));
    assert!(files[0]["path"].as_str().unwrap_or_default().starts_with("/uploads/photo-"));
    assert!(files[0]["filename"].as_str().unwrap_or_default().ends_with(".jpg"));
    assert_eq!(upload_count(&uploads), 2);
    Ok(())
}

#[tokio::test]
async fn test_upload_rejects_non_images_without_persisting() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let request = multipart_request(&[("front.jpg", "image/jpeg", b"jpeg"), ("notes.txt", "text/plain", b"hello")]);

    let (status, body) = send(offline_app(&uploads), request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(upload_count(&uploads), 0);
    Ok(())
}

#[tokio::test]
async fn test_upload_rejects_more_than_twenty_files() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let names: Vec<String> = (0..21).map(|i| format!("photo{}.jpg", i)).collect();
    let files: Vec<(&str, &str, &[u8])> = names
        .iter()
        .map(|name| (name.as_str(), "image/jpeg", b"jpeg".as_slice()))
        .collect();

    let (status, _) = send(offline_app(&uploads), multipart_request(&files)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(upload_count(&uploads), 0);
    Ok(())
}

#[tokio::test]
async fn test_list_requires_hosting() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let (status, body) = send(offline_app(&uploads), empty_request("GET", "/api/properties")).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn test_list_with_no_published_sites_is_empty() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/listings/contents/properties");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });

    let (status, body) = send(hosted_app(&uploads, &server), empty_request("GET", "/api/properties")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["properties"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_slug_fails() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/listings/contents/properties/nowhere-st");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });

    let (status, body) = send(
        hosted_app(&uploads, &server),
        empty_request("DELETE", "/api/properties/nowhere-st"),
    )
    .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    Ok(())
}

#[tokio::test]
async fn test_delete_rejects_malformed_slug() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let server = MockServer::start();
    let any_call = server.mock(|when, then| {
        when.path_contains("/repos/");
        then.status(500);
    });

    let (status, _) = send(
        hosted_app(&uploads, &server),
        empty_request("DELETE", "/api/properties/..%2Fsecrets"),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    any_call.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let uploads = TempDir::new()?;
    let response = offline_app(&uploads).oneshot(empty_request("GET", "/health")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    assert_eq!(&bytes[..], b"ok");
    Ok(())
}
