mod class;
mod list;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::courses))
        .route("/{class_id}", get(class::class_page))
        .route("/{class_id}/{module_id}", post(class::complete))
}
