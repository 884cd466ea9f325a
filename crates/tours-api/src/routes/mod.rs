mod health;
pub mod tours;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api/v1/tours", get(tours::list).post(tours::create))
        .route("/api/v1/tours/top-5-cheap", get(tours::top_cheap))
        .route(
            "/api/v1/tours/{id}",
            get(tours::get).patch(tours::update).delete(tours::delete),
        )
}
