//! Wishlist handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::{AppContext, IdQuery, Pagination};
use crate::error::Result;
use crate::store::snapshot::SnapshotRecord;
use crate::store::wishlist::WishlistItem;

const DEFAULT_PAGE: usize = 10;

/// POST /api/v1/wishlist/item
pub async fn create_item(
    State(ctx): State<AppContext>,
    Json(mut item): Json<WishlistItem>,
) -> Result<(StatusCode, Json<WishlistItem>)> {
    item.set_id(ctx.ids.next_id());
    ctx.wishlist.create(item.clone())?;
    tracing::info!(id = item.id, "wishlist item {} created successfully", item.id);
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/v1/wishlist/item?id=
pub async fn get_item(
    State(ctx): State<AppContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<WishlistItem>> {
    let id = query.require()?;
    Ok(Json(ctx.wishlist.get(&id)?))
}

/// PUT /api/v1/wishlist/item
pub async fn update_item(
    State(ctx): State<AppContext>,
    Json(item): Json<WishlistItem>,
) -> Result<StatusCode> {
    ctx.wishlist.update(item)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/wishlist/item?id=
pub async fn delete_item(
    State(ctx): State<AppContext>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode> {
    let id = query.require()?;
    ctx.wishlist.delete(&id)?;
    tracing::info!(id, "wishlist item {} deleted successfully", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/wishlist/items?amount=&cursor=
pub async fn list_items(
    State(ctx): State<AppContext>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<WishlistItem>>> {
    let (amount, cursor) = page.resolve(DEFAULT_PAGE);
    Ok(Json(ctx.wishlist.list(amount, cursor)?))
}
