use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use tours_query::{Query, QueryFeatures, RawParameters};

use crate::convert::{document_to_json, json_to_document};
use crate::error::ApiError;
use crate::state::AppState;

pub const TOP_TOURS_LIMIT: &str = "5";
pub const TOP_TOURS_SORT: &str = "-ratingsAverage,price";
pub const TOP_TOURS_FIELDS: &str = "name,price,ratingsAverage,summary,difficulty";

/// Parameters for the top-5-cheap listing: the caller's filters with the
/// alias's paging, order and fields laid over them.
pub fn top_tours_params(params: &RawParameters) -> RawParameters {
    params
        .clone()
        .with("limit", TOP_TOURS_LIMIT)
        .with("sort", TOP_TOURS_SORT)
        .with("fields", TOP_TOURS_FIELDS)
}

pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let params = RawParameters::from_query_string(query.as_deref().unwrap_or_default());
    list_tours(&state, params)
}

pub async fn top_cheap(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let params = RawParameters::from_query_string(query.as_deref().unwrap_or_default());
    list_tours(&state, top_tours_params(&params))
}

fn list_tours(state: &AppState, params: RawParameters) -> Result<Json<Value>, ApiError> {
    let query = QueryFeatures::new(Query::new(), params)
        .filter()
        .sort()
        .limit()
        .paginate()
        .into_query();

    let tours: Vec<Value> = state
        .tours
        .find(&query)?
        .into_iter()
        .map(document_to_json)
        .collect();

    Ok(Json(json!({
        "status": "success",
        "results": tours.len(),
        "data": { "tours": tours },
    })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let tour = state.tours.get(&id)?;
    Ok(Json(tour_envelope(tour)))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let doc = body_document(body)?;
    let tour = state.tours.insert(doc)?;
    Ok((StatusCode::CREATED, Json(tour_envelope(tour))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let patch = body_document(body)?;
    let tour = state.tours.update(&id, patch)?;
    Ok(Json(tour_envelope(tour)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.tours.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

fn body_document(body: Result<Json<Value>, JsonRejection>) -> Result<bson::Document, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    json_to_document(value).ok_or_else(|| ApiError::InvalidBody("expected a JSON object".into()))
}

fn tour_envelope(tour: bson::Document) -> Value {
    json!({
        "status": "success",
        "data": { "tour": document_to_json(tour) },
    })
}
