//! Integration tests for the HTTP surface: CRUD round trips per domain,
//! the multipart upload pipeline and problem-details error bodies.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, Rgb};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use hearth::api::{router, AppContext};
use hearth::config::DuplicateConfig;
use hearth::id::SnowflakeGenerator;
use hearth::ingest::PhotoService;
use hearth::object_store::{MemoryStore, ObjectStore};
use hearth::store::wishlist::WishlistStore;
use hearth::store::wool::WoolStore;
use hearth::store::Db;

fn test_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let db = Db::open(&dir.path().join("hearth.db")).unwrap();
    db.initialize().unwrap();

    let ids = Arc::new(SnowflakeGenerator::new(1, 1));
    let blobs = Arc::new(ObjectStore::Memory(MemoryStore::new()));
    let photos = PhotoService::new(
        Arc::clone(&ids),
        db.photos(),
        blobs,
        DuplicateConfig {
            max_distance: 4,
            limit: 1,
        },
    );
    let wool = Arc::new(WoolStore::open(dir.path().join("woolcatalogue.json")).unwrap());
    let wishlist = Arc::new(WishlistStore::open(dir.path().join("wishlist.json")).unwrap());

    let ctx = AppContext {
        ids,
        photos,
        people: db.people(),
        wool,
        wishlist,
    };
    (dir, router(ctx))
}

async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>, Option<String>) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).ok();
    (status, json, content_type)
}

fn png_bytes(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb(pixel(x, y)));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

const BOUNDARY: &str = "hearth-test-boundary";

fn multipart_upload(file: &[u8], description: &str, people: &str, tags: &str) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in [
        ("description", description),
        ("people", people),
        ("tags", tags),
    ] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; \
             filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &Router, file: &[u8]) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/photodump/photo")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_upload(
            file,
            "holiday snap",
            "Alex,Sam",
            "garden",
        )))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).ok())
}

#[tokio::test]
async fn health_reports_healthy() {
    let (_dir, app) = test_app();
    let (status, body, _) = request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["status"], "healthy");
}

#[tokio::test]
async fn wool_crud_round_trip() {
    let (_dir, app) = test_app();

    let (status, created, _) = request(
        &app,
        Method::POST,
        "/api/v1/woolcatalogue/wool",
        Some(json!({
            "name": "Highland Wool",
            "brand": "West Yorkshire Spinners",
            "ply": 4,
            "colour": "moss",
            "quantity": 3,
            "tags": ["sparkly"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created = created.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["name"], "Highland Wool");

    let (status, fetched, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/woolcatalogue/wool?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.unwrap(), created);

    let mut updated = created.clone();
    updated["quantity"] = json!(2);
    let (status, _, _) = request(
        &app,
        Method::PUT,
        "/api/v1/woolcatalogue/wool",
        Some(updated.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/woolcatalogue/wool?id={id}"),
        None,
    )
    .await;
    assert_eq!(fetched.unwrap()["quantity"], 2);

    let (status, listed, _) =
        request(&app, Method::GET, "/api/v1/woolcatalogue/wools", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.unwrap().as_array().unwrap().len(), 1);

    let (status, _, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/v1/woolcatalogue/wool?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem, content_type) = request(
        &app,
        Method::GET,
        &format!("/api/v1/woolcatalogue/wool?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    let problem = problem.unwrap();
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["title"], "Not Found");
    assert_eq!(problem["type"], "about:blank");
}

#[tokio::test]
async fn wool_get_without_id_is_bad_request() {
    let (_dir, app) = test_app();
    let (status, problem, _) =
        request(&app, Method::GET, "/api/v1/woolcatalogue/wool", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem.unwrap()["detail"], "no id in the query");
}

#[tokio::test]
async fn wishlist_crud_round_trip() {
    let (_dir, app) = test_app();

    let (status, created, _) = request(
        &app,
        Method::POST,
        "/api/v1/wishlist/item",
        Some(json!({
            "name": "garden trowel",
            "url": "https://example.com/trowel",
            "price": 14.5,
            "currency": "CAD"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created.unwrap()["id"].as_str().unwrap().to_string();

    let (status, fetched, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/wishlist/item?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.unwrap()["price"], 14.5);

    let (status, _, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/v1/wishlist/item?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn person_crud_and_lookup_by_name() {
    let (_dir, app) = test_app();

    let (status, created, _) = request(
        &app,
        Method::POST,
        "/api/v1/familytree/person",
        Some(json!({
            "name": "June",
            "surname": "Miller",
            "pronouns": "she/her",
            "parents": [],
            "is_adopted": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created.unwrap()["id"].as_str().unwrap().to_string();

    let (status, by_name, _) = request(
        &app,
        Method::GET,
        "/api/v1/familytree/person?name=June",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_name.unwrap()["id"].as_str().unwrap(), id);

    let (status, _, _) = request(
        &app,
        Method::PUT,
        "/api/v1/familytree/person",
        Some(json!({
            "id": id,
            "name": "June",
            "surname": "Miller-Hahn",
            "partner": "12345"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/familytree/person?id={id}"),
        None,
    )
    .await;
    assert_eq!(fetched.unwrap()["surname"], "Miller-Hahn");
}

#[tokio::test]
async fn photo_upload_pipeline_over_http() {
    let (_dir, app) = test_app();

    let gradient = png_bytes(64, 48, |x, y| [(x * 4) as u8, (y * 5) as u8, 32]);
    let (status, photo) = upload(&app, &gradient).await;
    assert_eq!(status, StatusCode::CREATED);
    let photo = photo.unwrap();
    assert_eq!(photo["ext"], "png");
    assert_eq!(photo["resolution"], "64x48p");
    assert_eq!(photo["description"], "holiday snap");
    assert_eq!(photo["people"], json!(["Alex", "Sam"]));
    let id = photo["id"].as_str().unwrap().to_string();
    let hash = photo["hash"].as_str().unwrap().to_string();
    assert_eq!(hash.len(), 64);

    // Fetch by id and by content hash.
    let (status, fetched, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/photodump/photo?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.unwrap()["hash"].as_str().unwrap(), hash);

    let (status, _, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/photodump/photo?hash={hash}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Re-uploading the same image trips the duplicate gate.
    let (status, problem) = upload(&app, &gradient).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem.unwrap()["detail"], "duplicate image");

    // Edit rewrites the user-editable fields.
    let (status, edited, _) = request(
        &app,
        Method::PUT,
        "/api/v1/photodump/photo",
        Some(json!({ "id": id, "description": "renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited.unwrap()["description"], "renamed");

    // Deletion is gated on the content hash.
    let (status, problem, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/v1/photodump/photo?id={id}&confirm=wrong"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        problem.unwrap()["detail"],
        "confirmation hash does not match photo hash"
    );

    let (status, _, _) = request(
        &app,
        Method::DELETE,
        &format!("/api/v1/photodump/photo?id={id}&confirm={hash}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = request(
        &app,
        Method::GET,
        &format!("/api/v1/photodump/photo?id={id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_rejects_non_image_payload() {
    let (_dir, app) = test_app();
    let (status, problem) = upload(&app, b"this is not an image").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = problem.unwrap()["detail"].as_str().unwrap().to_string();
    assert!(detail.starts_with("unsupported image type"), "{}", detail);
}

#[tokio::test]
async fn upload_without_file_part_is_rejected() {
    let (_dir, app) = test_app();
    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nno file\r\n--{BOUNDARY}--\r\n")
            .as_bytes(),
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/photodump/photo")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn photo_list_paginates() {
    let (_dir, app) = test_app();

    // Two images far apart perceptually.
    let gradient = png_bytes(64, 64, |x, y| [(x * 4) as u8, (y * 4) as u8, 0]);
    let checker = png_bytes(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            [255, 255, 255]
        } else {
            [0, 0, 0]
        }
    });
    assert_eq!(upload(&app, &gradient).await.0, StatusCode::CREATED);
    assert_eq!(upload(&app, &checker).await.0, StatusCode::CREATED);

    let (status, page, _) = request(
        &app,
        Method::GET,
        "/api/v1/photodump/photos?amount=1&cursor=0",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.unwrap().as_array().unwrap().len(), 1);

    let (status, _, _) = request(
        &app,
        Method::GET,
        "/api/v1/photodump/photos?amount=1&cursor=9",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
