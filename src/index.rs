use axum::{debug_handler, response::{IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{include_res, session::USERNAME, AppResult, Markdown};

#[debug_handler]
pub async fn index(
    session: Session
) -> AppResult<Response> {
    if session.get::<String>(USERNAME).await?.is_none() {
        return Ok(
            Redirect::to("/login")
                .into_response()
        );
    }

    Ok(Markdown("Home", include_res!(str, "/pages/home.md")).into_response())
}

#[debug_handler]
pub async fn gallery() -> impl IntoResponse {
    Markdown("Project Gallery", include_res!(str, "/pages/gallery.md"))
}
