use std::sync::Arc;

use axum::{debug_handler, extract::State, response::{IntoResponse, Response}};
use tower_sessions::Session;

use crate::{auth, include_res, res, store::progress, AppResult, AppState, Config, SharedAcademy};

/// User overview for the usernames listed in `ADMIN_USERS`.
#[debug_handler(state = AppState)]
pub async fn admin(
    State(academy): State<SharedAcademy>,
    State(config): State<Arc<Config>>,
    session: Session,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, "/admin").await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };
    if !config.is_admin(&username) {
        tracing::warn!(username, "admin panel refused");
        return res::sorry("admin panel");
    }

    let academy = academy.read().await;
    let mut users: Vec<_> = academy.users().iter().collect();
    users.sort_by(|a, b| a.username.cmp(&b.username));

    let rows: String = users
        .iter()
        .map(|user| {
            let overall = progress::overall_progress(user, academy.catalog());
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td><td>{}</td></tr>",
                res::escape(&user.username),
                res::escape(&user.full_name),
                user.user_id,
                overall.completed,
                overall.total,
                user.earned_badges().len(),
                academy.friends_of(&user.username).len(),
            )
        })
        .collect();

    Ok(res::page(
        "Admin Panel",
        &include_res!(str, "/pages/admin/panel.html")
            .replace("{user_count}", &users.len().to_string())
            .replace("{class_count}", &academy.catalog().classes().len().to_string())
            .replace("{rows}", &rows),
    ).into_response())
}
