use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{error::StoreError, include_res, password::Hasher, res, AppResult, AppState, SharedAcademy};

use super::start_session;

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    full_name: String,
}

fn register_form(username: &str, full_name: &str, message: Option<&str>) -> Response {
    res::page(
        "Join SkillSprout",
        &include_res!(str, "/pages/auth/register.html")
            .replace("{notice}", &res::notice(message))
            .replace("{username}", &res::escape(username))
            .replace("{full_name}", &res::escape(full_name)),
    ).into_response()
}

#[debug_handler]
pub(crate) async fn register_page() -> impl IntoResponse {
    register_form("", "", None)
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(academy): State<SharedAcademy>,
    State(hasher): State<Hasher>,
    session: Session,
    Form(RegisterForm { username, password, full_name }): Form<RegisterForm>,
) -> AppResult<Response> {
    let username = username.trim();
    let full_name = full_name.trim();
    if username.is_empty() || password.is_empty() || full_name.is_empty() {
        return Ok(register_form(username, full_name, Some("Please fill in every field.")));
    }

    if academy.read().await.user(username).is_some() {
        return Ok(register_form(username, full_name, Some(&StoreError::DuplicateUsername(username.to_owned()).to_string())));
    }

    let password_hash = hasher.hash_blocking(password).await?;
    if let Err(err) = academy.write().await.insert_user(username, password_hash, full_name) {
        return Ok(register_form(username, full_name, Some(&err.to_string())));
    }

    start_session(&session, username).await?;
    Ok(Redirect::to("/c").into_response())
}
