use axum::{response::{IntoResponse, Redirect, Response}, routing::get, Router};
use tower_sessions::Session;

use crate::{session::USERNAME, AppResult, AppState};

mod login;
mod logout;
mod register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page).post(login::login))
        .route("/register", get(register::register_page).post(register::register))
        .route("/logout", get(logout::logout))
}

/// The logged-in username, or a redirect to the login page that comes back to
/// `return_url` afterwards.
pub(crate) async fn require_user(session: &Session, return_url: &str) -> AppResult<Result<String, Response>> {
    match session.get::<String>(USERNAME).await? {
        Some(username) => Ok(Ok(username)),
        None => Ok(Err(
            Redirect::to(&format!("/login?return_url={return_url}")).into_response()
        )),
    }
}

/// Only same-site absolute paths are followed after login.
pub(crate) fn safe_return_url(return_url: Option<String>) -> String {
    match return_url {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.chars().any(|c| c == '\\' || c.is_ascii_control()) =>
        {
            url
        }
        _ => "/".to_owned(),
    }
}

pub(crate) async fn start_session(session: &Session, username: &str) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USERNAME, username).await?;
    Ok(())
}
