use std::sync::Arc;

use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use tower_sessions::Session;

use crate::{
    auth,
    catalog::{Catalog, ClassId, ModuleId},
    error::StoreError,
    include_res, res,
    session::{FLASH, USERNAME},
    store::progress,
    AppResult, AppState, SharedAcademy,
};

#[debug_handler(state = AppState)]
pub(crate) async fn class_page(
    Path(class_id): Path<ClassId>,
    State(catalog): State<Arc<Catalog>>,
    State(academy): State<SharedAcademy>,
    session: Session,
) -> AppResult<Response> {
    let Some(class) = catalog.class(class_id) else {
        return res::sorry("class");
    };
    let username = session.get::<String>(USERNAME).await?;
    let flash = session.remove::<String>(FLASH).await?;

    let academy = academy.read().await;
    let user = username.as_deref().and_then(|name| academy.user(name));

    let mut module_items = String::new();
    for module in &class.modules {
        let action = match user {
            Some(user) if user.has_completed(class.id, module.module_id) => {
                r#"<span class="done">Done!</span>"#.to_owned()
            }
            Some(_) => include_res!(str, "/pages/courses/complete_button.html")
                .replace("{class_id}", &class.id.to_string())
                .replace("{module_id}", &module.module_id.to_string()),
            None => String::new(),
        };
        module_items += &include_res!(str, "/pages/courses/module_item.html")
            .replace("{module_title}", &res::escape(&module.module_title))
            .replace("{action}", &action);
    }

    let badge = match catalog.badge_for_class(class.id) {
        Some(badge) => {
            let earned = user.is_some_and(|u| u.earned_badges().contains(&badge.badge_id));
            include_res!(str, "/pages/courses/badge.html")
                .replace("{badge_title}", &res::escape(&badge.title))
                .replace("{badge_description}", &res::escape(&badge.description))
                .replace("{state}", if earned { "earned" } else { "locked" })
        }
        None => String::new(),
    };

    let progress = match user {
        Some(user) => {
            let p = progress::class_progress(user, class);
            format!(r#"<progress max="{}" value="{}"></progress> {}%"#, p.total, p.completed, p.percent())
        }
        None => format!(r#"<a href="/login?return_url=/c/{}">Log in</a> to track your progress."#, class.id),
    };

    Ok(res::page(
        &class.title,
        &include_res!(str, "/pages/courses/class.html")
            .replace("{notice}", &res::notice(flash.as_deref()))
            .replace("{difficulty}", &class.difficulty.to_string())
            .replace("{age_range}", class.age_range.id())
            .replace("{description}", &res::markdown_to_html(&class.description))
            .replace("{progress}", &progress)
            .replace("{badge}", &badge)
            .replace("{module_items}", &module_items),
    ).into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn complete(
    Path((class_id, module_id)): Path<(ClassId, ModuleId)>,
    State(academy): State<SharedAcademy>,
    session: Session,
) -> AppResult<Response> {
    let username = match auth::require_user(&session, &format!("/c/{class_id}")).await? {
        Ok(username) => username,
        Err(redirect) => return Ok(redirect),
    };

    let earned = {
        let mut academy = academy.write().await;
        match academy.complete_and_award(&username, class_id, module_id) {
            Ok(badge) => badge.map(|b| b.title.clone()),
            Err(StoreError::UnknownClass(_) | StoreError::UnknownModule { .. }) => {
                return res::sorry("module");
            }
            Err(err) => return Err(err.into()),
        }
    };

    if let Some(title) = earned {
        session.insert(FLASH, format!("You earned the {title} badge!")).await?;
    }

    Ok(Redirect::to(&format!("/c/{class_id}")).into_response())
}
