//! Wool-catalogue handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::{AppContext, IdQuery, Pagination};
use crate::error::Result;
use crate::store::snapshot::SnapshotRecord;
use crate::store::wool::Wool;

const DEFAULT_PAGE: usize = 10;

/// POST /api/v1/woolcatalogue/wool — the identifier is assigned
/// server-side, any client-supplied one is discarded.
pub async fn create_wool(
    State(ctx): State<AppContext>,
    Json(mut wool): Json<Wool>,
) -> Result<(StatusCode, Json<Wool>)> {
    wool.set_id(ctx.ids.next_id());
    ctx.wool.create(wool.clone())?;
    tracing::info!(id = wool.id, "wool {} created successfully", wool.id);
    Ok((StatusCode::CREATED, Json(wool)))
}

/// GET /api/v1/woolcatalogue/wool?id=
pub async fn get_wool(
    State(ctx): State<AppContext>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Wool>> {
    let id = query.require()?;
    Ok(Json(ctx.wool.get(&id)?))
}

/// PUT /api/v1/woolcatalogue/wool
pub async fn update_wool(
    State(ctx): State<AppContext>,
    Json(wool): Json<Wool>,
) -> Result<StatusCode> {
    ctx.wool.update(wool)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/woolcatalogue/wool?id=
pub async fn delete_wool(
    State(ctx): State<AppContext>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode> {
    let id = query.require()?;
    ctx.wool.delete(&id)?;
    tracing::info!(id, "wool {} deleted successfully", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/woolcatalogue/wools?amount=&cursor=
pub async fn list_wools(
    State(ctx): State<AppContext>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Wool>>> {
    let (amount, cursor) = page.resolve(DEFAULT_PAGE);
    Ok(Json(ctx.wool.list(amount, cursor)?))
}
