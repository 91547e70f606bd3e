use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{error::StoreError, include_res, password::Hasher, res, session::RETURN_URL, AppResult, AppState, SharedAcademy};

use super::{safe_return_url, start_session};

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn login_form(username: &str, message: Option<&str>) -> Response {
    res::page(
        "Log in",
        &include_res!(str, "/pages/auth/login.html")
            .replace("{notice}", &res::notice(message))
            .replace("{username}", &res::escape(username)),
    ).into_response()
}

#[debug_handler]
pub(crate) async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    session: Session,
) -> AppResult<Response> {
    if let Some(return_url) = return_url {
        session.insert(RETURN_URL, return_url).await?;
    }
    Ok(login_form("", None))
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(academy): State<SharedAcademy>,
    State(hasher): State<Hasher>,
    session: Session,
    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Ok(login_form(username, Some("Please enter your username and password.")));
    }

    let stored_hash = academy.read().await.password_hash(username);
    let verified = match stored_hash {
        Some(hash) => hasher.verify_blocking(password, hash).await?,
        None => false,
    };
    if !verified {
        tracing::debug!(username, "login rejected");
        return Ok(login_form(username, Some(&StoreError::InvalidCredentials.to_string())));
    }

    let return_url = session.remove::<String>(RETURN_URL).await?;
    start_session(&session, username).await?;
    tracing::info!(username, "logged in");

    Ok(Redirect::to(&safe_return_url(return_url)).into_response())
}
