mod friends;
mod page;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::own_profile))
        .route("/bio", post(page::update_bio))
        .route("/friends", get(friends::friends_page).post(friends::add_friend))
        .route("/u/{user_id}", get(page::profile))
}
