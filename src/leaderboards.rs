use axum::{debug_handler, extract::{Query, State}, response::{IntoResponse, Response}};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{include_res, res, store::leaderboard::Category, AppResult, AppState, SharedAcademy};

#[derive(Deserialize)]
pub(crate) struct LeaderboardQuery {
    #[serde(default)]
    category: Category,
}

#[debug_handler(state = AppState)]
pub(crate) async fn leaderboards(
    Query(LeaderboardQuery { category }): Query<LeaderboardQuery>,
    State(academy): State<SharedAcademy>,
) -> AppResult<Response> {
    let entries = academy.read().await.leaderboard(category, OffsetDateTime::now_utc());

    let tabs: String = Category::ALL
        .iter()
        .map(|c| {
            let class = if *c == category { r#" class="active""# } else { "" };
            format!(r#"<a href="/leaderboards?category={}"{class}>{}</a> "#, c.id(), c.title())
        })
        .collect();

    let rows: String = entries
        .iter()
        .map(|entry| format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            entry.rank,
            res::escape(&entry.full_name),
            entry.score,
        ))
        .collect();

    Ok(res::page(
        "Leaderboards",
        &include_res!(str, "/pages/leaderboards.html")
            .replace("{tabs}", &tabs)
            .replace("{category}", category.title())
            .replace("{rows}", if rows.is_empty() { r#"<tr><td colspan="3">Nobody has signed up yet.</td></tr>"# } else { &rows }),
    ).into_response())
}
