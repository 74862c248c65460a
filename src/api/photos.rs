//! Photo-dump handlers.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{AppContext, Pagination};
use crate::error::{Error, Result};
use crate::ingest::{PhotoEdit, UploadRequest};
use crate::store::photos::Photo;

const DEFAULT_PAGE: usize = 12;

#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    pub id: Option<String>,
    pub hash: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
    pub confirm: Option<String>,
}

/// GET /api/v1/photodump/photo — fetch by id or by content hash.
pub async fn get_photo(
    State(ctx): State<AppContext>,
    Query(query): Query<PhotoQuery>,
) -> Result<Json<Photo>> {
    if let Some(id) = query.id {
        return Ok(Json(ctx.photos.get(&id)?));
    }
    if let Some(hash) = query.hash {
        return Ok(Json(ctx.photos.get_by_hash(&hash)?));
    }
    Err(Error::InvalidInput("no id in the query".to_string()))
}

/// POST /api/v1/photodump/photo — multipart upload through the ingest
/// pipeline. The file goes in a `photo` part; `description`, `people` and
/// `tags` are optional text parts (the latter two comma-separated).
pub async fn upload_photo(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Photo>)> {
    let mut request = UploadRequest::default();
    let mut file_seen = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("could not parse form: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("photo") => {
                request.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidInput(format!("could not read file contents: {}", e)))?
                    .to_vec();
                file_seen = true;
            }
            Some("description") => request.description = read_text(field).await?,
            Some("people") => request.people = split_csv(&read_text(field).await?),
            Some("tags") => request.tags = split_csv(&read_text(field).await?),
            _ => {}
        }
    }

    if !file_seen {
        return Err(Error::InvalidInput("file not uploaded".to_string()));
    }

    let photo = ctx.photos.upload(request).await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

/// PUT /api/v1/photodump/photo — rewrite user-editable fields.
pub async fn update_photo(
    State(ctx): State<AppContext>,
    Json(edit): Json<PhotoEdit>,
) -> Result<Json<Photo>> {
    Ok(Json(ctx.photos.edit(edit)?))
}

/// DELETE /api/v1/photodump/photo?id=&confirm= — the confirmation token
/// must equal the stored content hash.
pub async fn delete_photo(
    State(ctx): State<AppContext>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode> {
    let id = query
        .id
        .ok_or_else(|| Error::InvalidInput("no id in the query".to_string()))?;
    let confirm = query
        .confirm
        .ok_or_else(|| Error::InvalidInput("no confirm hash in the query".to_string()))?;
    ctx.photos.delete(&id, &confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/photodump/photos?amount=&cursor=
pub async fn list_photos(
    State(ctx): State<AppContext>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Photo>>> {
    let (amount, cursor) = page.resolve(DEFAULT_PAGE);
    Ok(Json(ctx.photos.list(amount, cursor)?))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| Error::InvalidInput(format!("could not parse form: {}", e)))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
