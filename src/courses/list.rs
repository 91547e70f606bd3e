use std::sync::Arc;

use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}};
use tower_sessions::Session;

use crate::{
    catalog::{AgeRange, Catalog, Difficulty},
    include_res, res,
    session::USERNAME,
    store::progress,
    AppResult, AppState, SharedAcademy,
};

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CourseFilter {
    pub(crate) ages: Vec<AgeRange>,
    pub(crate) difficulties: Vec<Difficulty>,
    pub(crate) rejected: Vec<String>,
}

impl CourseFilter {
    /// Query strings repeat keys for multi-select: `?age=4-7&age=8-10`.
    pub(crate) fn from_pairs(pairs: &[(String, String)]) -> CourseFilter {
        let mut filter = CourseFilter::default();
        for (key, value) in pairs {
            match key.as_str() {
                "age" => match value.parse::<AgeRange>() {
                    Ok(age) if !filter.ages.contains(&age) => filter.ages.push(age),
                    Ok(_) => {}
                    Err(_) => filter.rejected.push(value.clone()),
                },
                "difficulty" => match value.parse::<Difficulty>() {
                    Ok(d) if !filter.difficulties.contains(&d) => filter.difficulties.push(d),
                    Ok(_) => {}
                    Err(_) => filter.rejected.push(value.clone()),
                },
                _ => {}
            }
        }
        filter
    }
}

fn checkbox(name: &str, value: &str, checked: bool) -> String {
    format!(
        r#"<label><input type="checkbox" name="{name}" value="{value}"{}> {value}</label>"#,
        if checked { " checked" } else { "" },
        value = res::escape(value),
    )
}

#[debug_handler(state = AppState)]
pub(crate) async fn courses(
    Query(pairs): Query<Vec<(String, String)>>,
    State(catalog): State<Arc<Catalog>>,
    State(academy): State<SharedAcademy>,
    session: Session,
) -> AppResult<Response> {
    let filter = CourseFilter::from_pairs(&pairs);
    let username = session.get::<String>(USERNAME).await?;
    let academy = academy.read().await;
    let user = username.as_deref().and_then(|name| academy.user(name));

    let age_boxes: String = AgeRange::ALL
        .iter()
        .map(|age| checkbox("age", age.id(), filter.ages.contains(age)))
        .collect();
    let difficulty_boxes: String = Difficulty::ALL
        .iter()
        .map(|d| checkbox("difficulty", d.id(), filter.difficulties.contains(d)))
        .collect();

    let mut course_items = String::new();
    for class in catalog.filter_classes(&filter.ages, &filter.difficulties) {
        let progress = match user {
            Some(user) => {
                let p = progress::class_progress(user, class);
                format!("{}/{} modules done", p.completed, p.total)
            }
            None => format!("{} modules", class.modules.len()),
        };
        course_items += &include_res!(str, "/pages/courses/course_item.html")
            .replace("{id}", &class.id.to_string())
            .replace("{title}", &res::escape(&class.title))
            .replace("{difficulty}", &class.difficulty.to_string())
            .replace("{age_range}", class.age_range.id())
            .replace("{description}", &res::markdown_to_html(&class.description))
            .replace("{progress}", &progress);
    }
    if course_items.is_empty() {
        course_items = "<p>No courses match those filters yet.</p>".to_owned();
    }

    let message = (!filter.rejected.is_empty())
        .then(|| format!("Ignored unknown filter: {}", filter.rejected.join(", ")));

    Ok(res::page(
        "Courses",
        &include_res!(str, "/pages/courses/list.html")
            .replace("{notice}", &res::notice(message.as_deref()))
            .replace("{age_boxes}", &age_boxes)
            .replace("{difficulty_boxes}", &difficulty_boxes)
            .replace("{course_items}", &course_items),
    ).into_response())
}
