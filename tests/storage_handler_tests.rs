mod common;

use std::sync::Arc;

use common::{TestApp, spawn_app_with, state_with_storage, token_for};
use gcx_cms::{LocalDiskStorage, MockStorageService, models::Role};
use reqwest::{
    Client, StatusCode,
    multipart::{Form, Part},
};
use serde_json::Value;
use tempfile::{TempDir, tempdir};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

/// Spawns the app over a disk store rooted in a fresh temp dir. The dir must outlive the test.
async fn spawn_with_disk() -> (TestApp, TempDir) {
    let dir = tempdir().expect("temp dir");
    let mut state = state_with_storage(Arc::new(LocalDiskStorage::new(dir.path())));
    state.config.upload_dir = dir.path().to_path_buf();
    state.config.max_upload_bytes = 1024;
    (spawn_app_with(state).await, dir)
}

fn image_form(field: &str, file_name: &str, mime: &str, bytes: &[u8]) -> Form {
    let part = Part::bytes(bytes.to_vec())
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("mime");
    Form::new().part(field.to_string(), part)
}

#[tokio::test]
async fn test_upload_serve_and_delete_image() {
    let (app, dir) = spawn_with_disk().await;
    let client = Client::new();
    let token = token_for(&app.state, Role::Blogger, "blogger@gcx.test").await;

    let response = client
        .post(app.url("/api/media"))
        .bearer_auth(&token)
        .multipart(image_form("file", "chart.png", "image/png", PNG_BYTES))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let uploaded: Value = response.json().await.unwrap();
    let id = uploaded["id"].as_str().expect("id").to_string();
    let url = uploaded["url"].as_str().expect("url").to_string();
    assert_eq!(url, format!("/uploads/images/{id}"));
    assert_eq!(uploaded["type"], "image/png");
    assert!(dir.path().join("images").join(&id).is_file());

    // Served statically without a token.
    let served = client.get(app.url(&url)).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), PNG_BYTES);

    let listing: Value = client
        .get(app.url("/api/media"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.as_array().map(Vec::len), Some(1));

    let meta = client
        .get(app.url(&format!("/api/media/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(meta.status(), StatusCode::OK);

    let deleted = client
        .delete(app.url(&format!("/api/media/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body["message"], "File deleted successfully");

    let gone = client
        .get(app.url(&format!("/api/media/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legacy_upload_route_accepts_image_field() {
    let (app, _dir) = spawn_with_disk().await;
    let token = token_for(&app.state, Role::Admin, "admin@gcx.test").await;

    let response = Client::new()
        .post(app.url("/api/upload"))
        .bearer_auth(&token)
        .multipart(image_form("image", "logo.jpg", "image/jpeg", b"jpeg-bytes"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert!(body["name"].as_str().is_some_and(|name| name.ends_with(".jpg")));
}

#[tokio::test]
async fn test_upload_rejections() {
    let (app, dir) = spawn_with_disk().await;
    let client = Client::new();
    let token = token_for(&app.state, Role::Blogger, "blogger@gcx.test").await;

    let cases = [
        (
            image_form("file", "notes.txt", "text/plain", b"hello"),
            "Only image files are allowed",
        ),
        (
            image_form("file", "empty.png", "image/png", b""),
            "Uploaded file is empty",
        ),
        (
            image_form("file", "huge.png", "image/png", &[0u8; 2048]),
            "File exceeds the 1024 byte limit",
        ),
        (
            image_form("attachment", "chart.png", "image/png", PNG_BYTES),
            "No file uploaded",
        ),
    ];

    for (form, expected) in cases {
        let response = client
            .post(app.url("/api/media"))
            .bearer_auth(&token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{expected}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], expected);
    }

    let stored = std::fs::read_dir(dir.path().join("images"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_media_requires_content_role() {
    let (app, _dir) = spawn_with_disk().await;
    let client = Client::new();
    let token = token_for(&app.state, Role::Premium, "premium@gcx.test").await;

    let anonymous = client
        .post(app.url("/api/media"))
        .multipart(image_form("file", "chart.png", "image/png", PNG_BYTES))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let premium = client
        .get(app.url("/api/media"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(premium.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_media_name_is_a_400() {
    let (app, _dir) = spawn_with_disk().await;
    let token = token_for(&app.state, Role::Admin, "admin@gcx.test").await;

    // Encoded so the client does not normalize the dot segment away.
    let response = Client::new()
        .delete(app.url("/api/media/..%2Fsecret.txt"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_storage_failure_is_a_500_without_details() {
    let state = state_with_storage(Arc::new(MockStorageService::new_failing()));
    let app = spawn_app_with(state).await;
    let token = token_for(&app.state, Role::Admin, "admin@gcx.test").await;

    let response = Client::new()
        .get(app.url("/api/media"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_dashboard_counts_media() {
    let state = state_with_storage(Arc::new(MockStorageService::new()));
    state
        .storage
        .save(Some("a.png"), "image/png", PNG_BYTES)
        .await
        .unwrap();
    let app = spawn_app_with(state).await;
    let token = token_for(&app.state, Role::Admin, "admin@gcx.test").await;

    let stats: Value = Client::new()
        .get(app.url("/api/cms/dashboard/stats"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["media_files"], 1);
    assert_eq!(stats["total_posts"], 0);
}
