use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{auth, include_res, res, store::{progress, Academy, UserRecord}, AppResult, AppState, SharedAcademy};

#[derive(Deserialize)]
pub(crate) struct BioForm {
    #[serde(default)]
    bio: String,
}

fn render_profile(academy: &Academy, user: &UserRecord, editable: bool) -> String {
    let catalog = academy.catalog();

    let badge_items: String = user
        .earned_badges()
        .iter()
        .filter_map(|&id| catalog.badge(id))
        .map(|badge| format!(
            r#"<li class="badge earned" title="{}">{}</li>"#,
            res::escape(&badge.description),
            res::escape(&badge.title),
        ))
        .collect();

    let class_items: String = catalog
        .classes()
        .iter()
        .map(|class| {
            let p = progress::class_progress(user, class);
            format!(
                r#"<li><a href="/c/{}">{}</a> <progress max="{}" value="{}"></progress> {}/{}</li>"#,
                class.id, res::escape(&class.title), p.total, p.completed, p.completed, p.total,
            )
        })
        .collect();

    let bio = if editable {
        include_res!(str, "/pages/profiles/bio_form.html").replace("{bio}", &res::escape(&user.bio))
    } else if user.bio.is_empty() {
        String::new()
    } else {
        format!("<blockquote>{}</blockquote>", res::escape(&user.bio).replace('\n', "<br>"))
    };

    let overall = progress::overall_progress(user, catalog);
    include_res!(str, "/pages/profiles/profile.html")
        .replace("{full_name}", &res::escape(&user.full_name))
        .replace("{username}", &res::escape(&user.username))
        .replace("{bio}", &bio)
        .replace("{overall}", &format!("{} of {} modules", overall.completed, overall.total))
        .replace("{badge_items}", if badge_items.is_empty() { "<li>No badges yet.</li>" } else { &badge_items })
        .replace("{class_items}", &class_items)
}

#[debug_handler(state = AppState)]
pub(crate) async fn own_profile(
    State(academy): State<SharedAcademy>,
    session: Session,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, "/p").await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };

    let academy = academy.read().await;
    let Some(user) = academy.user(&username) else {
        // the session names a user the store no longer has
        session.flush().await?;
        return Ok(Redirect::to("/login?return_url=/p").into_response());
    };

    Ok(res::page("My profile", &render_profile(&academy, user, true)).into_response())
}

/// Friends can see each other's profiles; everyone else gets the sorry page.
#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    Path(user_id): Path<Uuid>,
    State(academy): State<SharedAcademy>,
    session: Session,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, &format!("/p/u/{user_id}")).await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };

    let academy = academy.read().await;
    let Some(user) = academy.user_by_id(user_id) else {
        return res::sorry("profile");
    };
    if user.username == username {
        return Ok(Redirect::to("/p").into_response());
    }
    if !academy.friends_of(&username).iter().any(|f| f.user_id == user_id) {
        return res::sorry("profile");
    }

    Ok(res::page(&user.full_name, &render_profile(&academy, user, false)).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_bio(
    State(academy): State<SharedAcademy>,
    session: Session,
    Form(BioForm { bio }): Form<BioForm>,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, "/p").await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };

    academy.write().await.update_bio(&username, &bio)?;
    Ok(Redirect::to("/p").into_response())
}
