//! Family-tree handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{AppContext, IdQuery, Pagination};
use crate::error::Result;
use crate::store::people::Person;

const DEFAULT_PAGE: usize = 10;

#[derive(Debug, Deserialize)]
pub struct PersonQuery {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// POST /api/v1/familytree/person
pub async fn create_person(
    State(ctx): State<AppContext>,
    Json(mut person): Json<Person>,
) -> Result<(StatusCode, Json<Person>)> {
    person.id = ctx.ids.next_id();
    ctx.people.create(&person)?;
    tracing::info!(id = person.id, "person {} created successfully", person.id);
    Ok((StatusCode::CREATED, Json(person)))
}

/// GET /api/v1/familytree/person — fetch by id or by name.
pub async fn get_person(
    State(ctx): State<AppContext>,
    Query(query): Query<PersonQuery>,
) -> Result<Json<Person>> {
    if let Some(id) = query.id {
        return Ok(Json(ctx.people.get(&id)?));
    }
    if let Some(name) = query.name {
        return Ok(Json(ctx.people.get_by_name(&name)?));
    }
    Err(crate::error::Error::InvalidInput(
        "no id in the query".to_string(),
    ))
}

/// PUT /api/v1/familytree/person
pub async fn update_person(
    State(ctx): State<AppContext>,
    Json(person): Json<Person>,
) -> Result<StatusCode> {
    ctx.people.update(&person)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/familytree/person?id=
pub async fn delete_person(
    State(ctx): State<AppContext>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode> {
    let id = query.require()?;
    ctx.people.delete(&id)?;
    tracing::info!(id, "person {} deleted successfully", id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/familytree/people?amount=&cursor=
pub async fn list_people(
    State(ctx): State<AppContext>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Person>>> {
    let (amount, cursor) = page.resolve(DEFAULT_PAGE);
    Ok(Json(ctx.people.list(amount, cursor)?))
}
