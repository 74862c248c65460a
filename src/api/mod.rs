//! HTTP surface: one handler per route, JSON bodies, problem-details errors.

pub mod people;
pub mod photos;
pub mod problem;
pub mod wishlist;
pub mod wool;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::id::SnowflakeGenerator;
use crate::ingest::PhotoService;
use crate::store::people::PersonStore;
use crate::store::wishlist::WishlistStore;
use crate::store::wool::WoolStore;

/// Shared application context passed to all handlers.
#[derive(Clone)]
pub struct AppContext {
    pub ids: Arc<SnowflakeGenerator>,
    pub photos: PhotoService,
    pub people: PersonStore,
    pub wool: Arc<WoolStore>,
    pub wishlist: Arc<WishlistStore>,
}

/// `?id=` query common to the fetch/delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn require(self) -> crate::error::Result<String> {
        self.id
            .ok_or_else(|| crate::error::Error::InvalidInput("no id in the query".to_string()))
    }
}

/// `?amount=&cursor=` pagination for the list endpoints.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub amount: Option<usize>,
    pub cursor: Option<usize>,
}

impl Pagination {
    pub fn resolve(&self, default_amount: usize) -> (usize, usize) {
        (
            self.amount.unwrap_or(default_amount),
            self.cursor.unwrap_or(0),
        )
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/photodump/photo",
            get(photos::get_photo)
                .post(photos::upload_photo)
                .put(photos::update_photo)
                .delete(photos::delete_photo),
        )
        .route("/api/v1/photodump/photos", get(photos::list_photos))
        .route(
            "/api/v1/woolcatalogue/wool",
            get(wool::get_wool)
                .post(wool::create_wool)
                .put(wool::update_wool)
                .delete(wool::delete_wool),
        )
        .route("/api/v1/woolcatalogue/wools", get(wool::list_wools))
        .route(
            "/api/v1/familytree/person",
            get(people::get_person)
                .post(people::create_person)
                .put(people::update_person)
                .delete(people::delete_person),
        )
        .route("/api/v1/familytree/people", get(people::list_people))
        .route(
            "/api/v1/wishlist/item",
            get(wishlist::get_item)
                .post(wishlist::create_item)
                .put(wishlist::update_item)
                .delete(wishlist::delete_item),
        )
        .route("/api/v1/wishlist/items", get(wishlist::list_items))
        // Photo uploads comfortably exceed axum's 2 MB default.
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}
